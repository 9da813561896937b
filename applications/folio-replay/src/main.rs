/// Folio Replay - inspect resume behaviour from recorded sessions
use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_core::{KeyValueStore, PersistedPosition};
use folio_playback::format_time;
use folio_replay::{ReplayConfig, Replayer, Session};
use folio_storage::JsonFileStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio-replay")]
#[command(about = "Replay reading and listening sessions against the Folio progress engine", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./folio.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Store file path (overrides the configuration)
    #[arg(short, long, global = true, env = "FOLIO_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a session transcript
    Replay {
        /// Session transcript (JSON)
        session: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the saved position for a key
    Show {
        /// Storage key, e.g. progress-42 or podcast-progress-7
        key: String,
    },
    /// List every stored entry
    Dump,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "folio_replay=info,folio_progress=info,folio_playback=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = ReplayConfig::load(cli.config.as_deref())?;
    config.validate()?;
    let store_path = cli.store.unwrap_or_else(|| config.store_path.clone());

    match cli.command {
        Commands::Replay { session, json } => replay(&config, &store_path, &session, json)?,
        Commands::Show { key } => show(&store_path, &key)?,
        Commands::Dump => dump(&store_path)?,
    }

    Ok(())
}

fn replay(config: &ReplayConfig, store_path: &Path, session_path: &Path, json: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(session_path)
        .with_context(|| format!("reading session {}", session_path.display()))?;
    let session = Session::from_json(&raw)?;

    let store = Arc::new(JsonFileStore::open(store_path)?);
    tracing::info!("Store: {}", store.path().display());

    let report = Replayer::new(store, config.progress.clone()).run(&session)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}

fn show(store_path: &Path, key: &str) -> anyhow::Result<()> {
    let store = JsonFileStore::open(store_path)?;

    match store.get(key)? {
        Some(raw) => match PersistedPosition::decode(&raw) {
            Some(position) => println!("{key}: {position} ({})", format_time(position)),
            None => println!("{key}: unreadable value {raw:?}"),
        },
        None => println!("{key}: no saved position"),
    }

    Ok(())
}

fn dump(store_path: &Path) -> anyhow::Result<()> {
    let store = JsonFileStore::open(store_path)?;

    let entries = store.entries();
    if entries.is_empty() {
        println!("{} is empty", store.path().display());
    }
    for (key, value) in entries {
        println!("{key} = {value}");
    }

    Ok(())
}
