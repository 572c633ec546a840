use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kick_counter::config::KickConfig;
use kick_counter::db::Database;
use kick_counter::store::SessionStore;
use kick_counter::{display, guide, tui};

#[derive(Parser)]
#[command(name = "kick")]
#[command(about = "Count fetal kicks and track how long ten kicks take")]
struct Cli {
    /// Session database (overrides KICK_COUNTER_DB and the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive counter (default)
    Count,
    /// List past sessions, most recent first
    History {
        /// Show at most this many sessions
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print the stored JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete one session by id
    Delete { id: String },
    /// Delete every session
    Clear {
        /// Confirm deleting the whole history
        #[arg(long)]
        yes: bool,
    },
    /// How to count kicks
    Guide,
    /// Show or change configuration
    Config {
        /// Ring the terminal bell on each counted kick
        #[arg(long)]
        haptics: Option<bool>,
    },
}

/// Initialize tracing to stderr, or to a log file while the TUI owns the terminal
fn init_tracing(log_file: Option<PathBuf>) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "kick_counter=info".into()),
    );

    let file = log_file.and_then(|path| {
        std::fs::create_dir_all(path.parent()?).ok()?;
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match file {
        Some(file) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init(),
        None => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn open_store(path: PathBuf) -> anyhow::Result<SessionStore<Database>> {
    let db = Database::open(path.clone())
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    db.migrate()?;
    Ok(SessionStore::new(db))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_err) = KickConfig::load_or_default();
    let db_path = config.resolve_database_path(cli.db)?;

    // The TUI needs stdout and stderr clean, so its logs go next to the database
    let interactive = matches!(cli.command, None | Some(Commands::Count));
    init_tracing(interactive.then(|| db_path.with_extension("log")));

    if let Some(e) = config_err {
        tracing::warn!("Failed to load config, using defaults: {:#}", e);
    }

    match cli.command {
        None | Some(Commands::Count) => {
            let store = open_store(db_path)?;
            tui::run(store, config.haptics).await?;
        }
        Some(Commands::History { limit, json }) => {
            let store = open_store(db_path)?;
            let sessions = match limit {
                Some(limit) => store.recent_sessions(limit),
                None => store.get_all_sessions(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else {
                print!("{}", display::render_history(&sessions));
            }
        }
        Some(Commands::Delete { id }) => {
            let store = open_store(db_path)?;
            if store.delete_session(&id)? {
                println!("Deleted session {}", id);
            } else {
                println!("No session with id {}", id);
            }
        }
        Some(Commands::Clear { yes }) => {
            if !yes {
                anyhow::bail!("Refusing to clear all sessions without --yes");
            }
            let store = open_store(db_path)?;
            store.clear_all()?;
            println!("Cleared all sessions");
        }
        Some(Commands::Guide) => {
            print!("{}", guide::render());
        }
        Some(Commands::Config { haptics }) => {
            let mut config = config;
            if let Some(haptics) = haptics {
                config.haptics = haptics;
                config.save()?;
            }
            println!("database: {}", db_path.display());
            println!("haptics:  {}", config.haptics);
        }
    }

    Ok(())
}
