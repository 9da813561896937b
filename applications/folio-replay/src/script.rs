//! Session transcripts
//!
//! A transcript records what a reader or listener did, with timestamps in
//! milliseconds from the start of the session:
//!
//! ```json
//! {
//!   "content": { "article": { "story_id": "42", "scroll_height": 10000, "client_height": 1000 } },
//!   "steps": [
//!     { "at_ms": 500, "action": "scroll", "top": 3600 },
//!     { "at_ms": 4000, "action": "leave" },
//!     { "at_ms": 60000, "action": "return" },
//!     { "at_ms": 61000, "action": "resume" }
//!   ]
//! }
//! ```

use crate::error::{ReplayError, Result};
use folio_core::PositionKey;
use serde::{Deserialize, Serialize};

/// A recorded session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Session {
    pub content: Content,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// What was being read or listened to
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Article(Article),
    Audio(Audio),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Article {
    pub story_id: String,

    /// Total content height in pixels
    pub scroll_height: f64,

    /// Viewport height in pixels
    pub client_height: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Audio {
    /// Story or podcast identifier
    pub id: String,

    /// Narration voice; saved separately per voice
    #[serde(default)]
    pub voice: Option<String>,

    /// Length in seconds (absent for live streams)
    #[serde(default)]
    pub duration: Option<f64>,

    #[serde(default)]
    pub live: bool,

    /// Simulate a load failure with this message
    #[serde(default)]
    pub load_error: Option<String>,
}

/// One recorded action
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Step {
    /// Milliseconds from session start
    pub at_ms: u64,

    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    // Article
    Scroll { top: f64 },
    Resize { scroll_height: f64, client_height: f64 },
    Resume,
    Dismiss,

    // Audio
    Play,
    Pause,
    /// Let time pass
    Advance,
    Seek { to: f64 },
    Skip { seconds: f64 },
    Rate { rate: f64 },
    Volume { level: f64 },
    Mute,

    // Both
    /// Navigate away (the view is torn down cleanly)
    Leave,
    /// Close the tab (no teardown)
    Close,
    /// Open the content again
    Return,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Scroll { .. } => "scroll",
            Action::Resize { .. } => "resize",
            Action::Resume => "resume",
            Action::Dismiss => "dismiss",
            Action::Play => "play",
            Action::Pause => "pause",
            Action::Advance => "advance",
            Action::Seek { .. } => "seek",
            Action::Skip { .. } => "skip",
            Action::Rate { .. } => "rate",
            Action::Volume { .. } => "volume",
            Action::Mute => "mute",
            Action::Leave => "leave",
            Action::Close => "close",
            Action::Return => "return",
        }
    }

    pub fn is_article_step(&self) -> bool {
        matches!(
            self,
            Action::Scroll { .. }
                | Action::Resize { .. }
                | Action::Resume
                | Action::Dismiss
                | Action::Leave
                | Action::Close
                | Action::Return
        )
    }

    pub fn is_audio_step(&self) -> bool {
        !matches!(
            self,
            Action::Scroll { .. } | Action::Resize { .. } | Action::Resume | Action::Dismiss
        )
    }
}

impl Session {
    pub fn from_json(raw: &str) -> Result<Self> {
        let session: Session = serde_json::from_str(raw)?;
        session.validate()?;
        Ok(session)
    }

    /// Key the session's position is saved under
    pub fn key(&self) -> PositionKey {
        match &self.content {
            Content::Article(article) => PositionKey::reading(&article.story_id),
            Content::Audio(audio) => match &audio.voice {
                Some(voice) => PositionKey::narration(&audio.id, voice),
                None => PositionKey::podcast(&audio.id),
            },
        }
    }

    /// Steps must be in time order and fit the content type
    pub fn validate(&self) -> Result<()> {
        let mut last = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if step.at_ms < last {
                return Err(ReplayError::script(format!(
                    "step {} at {}ms is earlier than the step before it",
                    index, step.at_ms
                )));
            }
            last = step.at_ms;

            let fits = match self.content {
                Content::Article(_) => step.action.is_article_step(),
                Content::Audio(_) => step.action.is_audio_step(),
            };
            if !fits {
                return Err(ReplayError::script(format!(
                    "step {} (`{}`) does not apply to this content",
                    index,
                    step.action.name()
                )));
            }
        }

        if let Content::Article(article) = &self.content {
            if !(article.scroll_height.is_finite() && article.client_height.is_finite()) {
                return Err(ReplayError::script("article dimensions must be finite"));
            }
        }

        Ok(())
    }
}
