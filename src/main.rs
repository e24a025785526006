//! # Portal Harvest CLI (`harvest`)
//!
//! ## Usage
//!
//! ```bash
//! harvest --config ./config/harvest.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `harvest init` | Create the SQLite store and the `persons` table |
//! | `harvest login` | Log in to the portal and report the result |
//! | `harvest run` | Walk the configured id range and store records |
//! | `harvest get <uid>` | Print one stored record |
//! | `harvest stats` | Summarise the store |
//! | `harvest export` | Dump all records as JSON |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use portal_harvest::harvest::RunOptions;
use portal_harvest::progress::ProgressMode;
use portal_harvest::store::RecordStore;
use portal_harvest::{config, export, get, harvest, logging, stats};

/// Portal Harvest: a sequential profile harvester for LMS portals.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/harvest.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "harvest",
    about = "Portal Harvest: sequential profile harvester for LMS portals",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/harvest.toml")]
    config: PathBuf,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the record store.
    ///
    /// Creates the SQLite file and the `persons` table. Idempotent.
    Init,

    /// Log in to the portal without harvesting.
    ///
    /// Useful for checking the credentials file and the token selector
    /// before starting a long run.
    Login,

    /// Harvest profiles over an id range.
    ///
    /// Logs in once, then fetches each id in `[start, end)` in order,
    /// pausing between requests. Failed ids are logged and skipped.
    Run {
        /// First id to fetch (overrides `harvest.start`).
        #[arg(long)]
        start: Option<i64>,

        /// Stop before this id (overrides `harvest.end`).
        #[arg(long)]
        end: Option<i64>,

        /// Pause between requests in milliseconds (overrides `harvest.delay_ms`).
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Progress output on stderr. Defaults to `human` on a TTY, else `off`.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Print a stored record.
    Get {
        /// Profile uid.
        uid: i64,
    },

    /// Summarise the record store.
    Stats,

    /// Export all records as JSON.
    Export {
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let store = RecordStore::open(&cfg.db.path).await?;
            store.close().await;
            println!("Store initialized at {}", cfg.db.path.display());
        }
        Commands::Login => {
            harvest::run_login(&cfg).await?;
        }
        Commands::Run {
            start,
            end,
            delay_ms,
            progress,
        } => {
            let reporter = progress
                .unwrap_or_else(ProgressMode::default_for_tty)
                .reporter();
            let options = RunOptions {
                start,
                end,
                delay_ms,
            };
            harvest::run_harvest(&cfg, options, reporter.as_ref()).await?;
        }
        Commands::Get { uid } => {
            get::run_get(&cfg, uid).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
    }

    Ok(())
}
