//! Integration tests for session replay
//!
//! Each test replays a transcript against a JSON file store in a temporary
//! directory, the way the CLI does.

use folio_core::{KeyValueStore, ProgressSettings};
use folio_replay::{Exit, Replayer, Session};
use folio_storage::JsonFileStore;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

// ===== Test Helpers =====

fn replay(store_path: &Path, transcript: &str) -> folio_replay::Report {
    let session = Session::from_json(transcript).expect("valid transcript");
    let store = Arc::new(JsonFileStore::open(store_path).expect("store opens"));
    Replayer::new(store, ProgressSettings::default())
        .run(&session)
        .expect("replay succeeds")
}

fn logged(report: &folio_replay::Report, needle: &str) -> bool {
    report.log.iter().any(|line| line.message.contains(needle))
}

// ===== Articles =====

#[test]
fn test_article_read_leave_return_resume() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("store.json");

    let report = replay(
        &store_path,
        r#"{
            "content": { "article": { "story_id": "lighthouse", "scroll_height": 10000, "client_height": 1000 } },
            "steps": [
                { "at_ms": 100, "action": "scroll", "top": 1000 },
                { "at_ms": 300, "action": "scroll", "top": 2500 },
                { "at_ms": 600, "action": "scroll", "top": 3600 },
                { "at_ms": 1000, "action": "leave" },
                { "at_ms": 60000, "action": "return" },
                { "at_ms": 61000, "action": "resume" }
            ]
        }"#,
    );

    assert_eq!(report.key.as_str(), "progress-lighthouse");
    assert_eq!(report.visits.len(), 2);
    assert_eq!(report.visits[0].resume, None);
    assert_eq!(report.visits[0].exit, Exit::Left);
    assert_eq!(report.visits[1].resume, Some(3600.0));
    assert_eq!(report.visits[1].final_position, 3600.0);
    assert!(logged(&report, "Smooth scroll to 3600px (40%)"));
    assert_eq!(report.saved_position, Some(3600.0));

    // The store file outlives the replay
    let store = JsonFileStore::open(&store_path).unwrap();
    assert_eq!(
        store.get("progress-lighthouse").unwrap().as_deref(),
        Some("3600")
    );
}

#[test]
fn test_article_closed_inside_debounce_window_saves_nothing() {
    let dir = TempDir::new().unwrap();

    let report = replay(
        &dir.path().join("store.json"),
        r#"{
            "content": { "article": { "story_id": "1", "scroll_height": 5000, "client_height": 1000 } },
            "steps": [
                { "at_ms": 100, "action": "scroll", "top": 2000 },
                { "at_ms": 1500, "action": "close" }
            ]
        }"#,
    );

    assert_eq!(report.visits[0].exit, Exit::Closed);
    assert_eq!(report.saved_position, None);
}

#[test]
fn test_article_debounced_write_lands_before_close() {
    let dir = TempDir::new().unwrap();

    let report = replay(
        &dir.path().join("store.json"),
        r#"{
            "content": { "article": { "story_id": "1", "scroll_height": 5000, "client_height": 1000 } },
            "steps": [
                { "at_ms": 100, "action": "scroll", "top": 2000 },
                { "at_ms": 5000, "action": "close" }
            ]
        }"#,
    );

    let write = report
        .log
        .iter()
        .find(|line| line.message == "saved 2000px")
        .expect("debounced write");
    assert_eq!(write.at_ms, 2100);
    assert_eq!(report.saved_position, Some(2000.0));
}

#[test]
fn test_article_shrunk_content_saves_clamped_offset() {
    let dir = TempDir::new().unwrap();

    let report = replay(
        &dir.path().join("store.json"),
        r#"{
            "content": { "article": { "story_id": "9", "scroll_height": 10000, "client_height": 1000 } },
            "steps": [
                { "at_ms": 100, "action": "scroll", "top": 8000 },
                { "at_ms": 5000, "action": "resize", "scroll_height": 5000, "client_height": 1000 },
                { "at_ms": 5500, "action": "leave" }
            ]
        }"#,
    );

    assert!(logged(&report, "saved 8000px"));
    assert!(logged(&report, "resized, now at 100%"));
    assert!(logged(&report, "left, saved 4000px"));
    assert_eq!(report.visits[0].final_position, 4000.0);
    assert_eq!(report.saved_position, Some(4000.0));
}

#[test]
fn test_article_closed_with_pending_write_reports_loss() {
    let dir = TempDir::new().unwrap();

    let report = replay(
        &dir.path().join("store.json"),
        r#"{
            "content": { "article": { "story_id": "10", "scroll_height": 5000, "client_height": 1000 } },
            "steps": [
                { "at_ms": 100, "action": "scroll", "top": 2000 },
                { "at_ms": 1500, "action": "close" }
            ]
        }"#,
    );

    assert!(logged(&report, "tab closed, unsaved offset lost"));
    assert_eq!(report.saved_position, None);
}

#[test]
fn test_dismissed_prompt_keeps_saved_offset() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("store.json");

    replay(
        &store_path,
        r#"{
            "content": { "article": { "story_id": "7", "scroll_height": 5000, "client_height": 1000 } },
            "steps": [
                { "at_ms": 100, "action": "scroll", "top": 1200 },
                { "at_ms": 400, "action": "leave" }
            ]
        }"#,
    );

    let report = replay(
        &store_path,
        r#"{
            "content": { "article": { "story_id": "7", "scroll_height": 5000, "client_height": 1000 } },
            "steps": [ { "at_ms": 500, "action": "dismiss" } ]
        }"#,
    );

    assert_eq!(report.visits[0].resume, Some(1200.0));
    assert!(logged(&report, "prompt dismissed"));
    // Opening and looking does not overwrite the saved offset
    assert_eq!(report.saved_position, Some(1200.0));
}

// ===== Audio =====

#[test]
fn test_audio_closed_mid_playback_resumes_near_last_position() {
    let dir = TempDir::new().unwrap();

    let report = replay(
        &dir.path().join("store.json"),
        r#"{
            "content": { "audio": { "id": "42", "voice": "algenib", "duration": 120 } },
            "steps": [
                { "at_ms": 0, "action": "play" },
                { "at_ms": 12000, "action": "close" },
                { "at_ms": 20000, "action": "return" }
            ]
        }"#,
    );

    assert_eq!(report.key.as_str(), "narration-progress-42-algenib");
    assert_eq!(report.visits[0].exit, Exit::Closed);
    assert_eq!(report.visits[0].final_position, 12.0);

    let resumed = report.visits[1].resume.expect("auto-resume on return");
    assert!((12.0 - resumed).abs() <= 2.0, "resumed at {resumed}");
    assert!(logged(&report, "resumed at 0:1"));
}

#[test]
fn test_audio_rate_change_and_skip_clamp() {
    let dir = TempDir::new().unwrap();

    let report = replay(
        &dir.path().join("store.json"),
        r#"{
            "content": { "audio": { "id": "7", "duration": 60 } },
            "steps": [
                { "at_ms": 0, "action": "play" },
                { "at_ms": 20000, "action": "rate", "rate": 1.5 },
                { "at_ms": 30000, "action": "skip", "seconds": 10 },
                { "at_ms": 30000, "action": "skip", "seconds": 10 },
                { "at_ms": 30000, "action": "skip", "seconds": 10 }
            ]
        }"#,
    );

    assert!(logged(&report, "rate: OneAndHalf"));
    assert!(logged(&report, "skip: 45.0"));
    assert!(logged(&report, "skip: 55.0"));
    assert!(logged(&report, "skip: 60.0"));
    assert_eq!(report.saved_position, Some(60.0));
}

#[test]
fn test_audio_unsupported_rate_is_reported() {
    let dir = TempDir::new().unwrap();

    let report = replay(
        &dir.path().join("store.json"),
        r#"{
            "content": { "audio": { "id": "7", "duration": 60 } },
            "steps": [ { "at_ms": 0, "action": "rate", "rate": 3.0 } ]
        }"#,
    );

    assert!(logged(&report, "rate rejected: Unsupported playback rate: 3"));
}

#[test]
fn test_live_stream_session_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("store.json");

    let report = replay(
        &store_path,
        r#"{
            "content": { "audio": { "id": "radio", "live": true } },
            "steps": [
                { "at_ms": 0, "action": "play" },
                { "at_ms": 1000, "action": "mute" },
                { "at_ms": 2000, "action": "mute" },
                { "at_ms": 3000, "action": "volume", "level": 0.3 },
                { "at_ms": 4000, "action": "skip", "seconds": 10 },
                { "at_ms": 600000, "action": "pause" }
            ]
        }"#,
    );

    assert!(logged(&report, "volume 30%"));
    assert!(logged(&report, "skip rejected: skip is not available in this mode"));
    assert_eq!(report.saved_position, None);

    let store = JsonFileStore::open(&store_path).unwrap();
    assert!(store.entries().is_empty());
}

#[test]
fn test_failed_load_is_inert() {
    let dir = TempDir::new().unwrap();

    let report = replay(
        &dir.path().join("store.json"),
        r#"{
            "content": { "audio": { "id": "gone", "duration": 60, "load_error": "404 Not Found" } },
            "steps": [
                { "at_ms": 0, "action": "play" },
                { "at_ms": 100, "action": "seek", "to": 30 },
                { "at_ms": 5000, "action": "leave" }
            ]
        }"#,
    );

    assert!(logged(&report, "load failed: 404 Not Found"));
    assert!(logged(&report, "play rejected: No media loaded"));
    assert!(logged(&report, "seek rejected: No media loaded"));
    assert_eq!(report.saved_position, None);
}

#[test]
fn test_report_renders_summary() {
    let dir = TempDir::new().unwrap();

    let report = replay(
        &dir.path().join("store.json"),
        r#"{
            "content": { "audio": { "id": "3", "duration": 30 } },
            "steps": [
                { "at_ms": 0, "action": "play" },
                { "at_ms": 4000, "action": "pause" }
            ]
        }"#,
    );

    let text = report.to_string();
    assert!(text.starts_with("session podcast-progress-3"));
    assert!(text.contains("visit 1: resume none, ended at 4 (Left)"));
    assert!(text.ends_with("saved position: 4"));
}
