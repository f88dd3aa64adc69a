mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cruise_feed::{
    LineId, LineIdMap, Scope, SyncOrchestrator, WebhookEventProcessor, parse_path_targets,
};
use cruise_feed_store::{MemoryCache, SqliteCruiseStore};
use cruise_feed_supplier::HttpSupplierClient;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cruise-feed")]
#[command(about = "Sync cruise inventory and pricing from the supplier feed")]
struct Cli {
    /// Config file path (defaults to ~/.config/cruise-feed/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file path (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a sync over a scope of cruises
    Sync {
        #[command(subcommand)]
        scope: SyncScope,
    },
    /// Process a supplier webhook body from a file or stdin
    Webhook {
        /// File containing the webhook JSON body (stdin if omitted)
        file: Option<PathBuf>,
    },
    /// Show store contents and per-line sync freshness
    Status,
}

#[derive(Subcommand)]
enum SyncScope {
    /// Every known cruise under one local line
    Line {
        /// Local cruise-line id
        line_id: u32,
    },
    /// Cruises sailing within the configured recent window
    Recent {
        /// Override the configured window, in days
        #[arg(long)]
        days: Option<u32>,
    },
    /// An explicit list of supplier file paths
    Paths {
        /// Supplier paths, e.g. 2025/09/3/12/2109407.json
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("could not determine data directory")?;
    let dir = base.join("cruise-feed");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory: {}", dir.display()))?;
    Ok(dir)
}

fn db_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(data_dir()?.join("cruises.db")),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_ref());

    let db = db_path(cli.db)?;
    tracing::debug!(db = %db.display(), "opening cruise store");
    let store = Arc::new(SqliteCruiseStore::open(&db).map_err(|e| anyhow::anyhow!("{e}"))?);

    if let Command::Status = cli.command {
        return commands::status::run(&store);
    }

    if config.supplier.base_url.is_empty() {
        anyhow::bail!(
            "no supplier base_url configured; set [supplier].base_url or CRUISEFEED_SUPPLIER_URL"
        );
    }

    let line_map = Arc::new(config.line_map());
    let fetcher = Arc::new(HttpSupplierClient::new(config.supplier_client_config()));
    let cache = Arc::new(MemoryCache::new());

    let orchestrator = SyncOrchestrator::new(
        fetcher,
        Arc::clone(&store),
        cache,
        Arc::clone(&line_map),
        config.downloader_config(),
    );

    match cli.command {
        Command::Sync { scope } => {
            let scope = build_scope(scope, &config, &line_map);
            commands::sync::run(&orchestrator, scope).await
        }
        Command::Webhook { file } => {
            let processor = WebhookEventProcessor::new(Arc::clone(&line_map));
            commands::webhook::run(&orchestrator, &processor, file).await
        }
        Command::Status => unreachable!("handled above"),
    }
}

fn build_scope(scope: SyncScope, config: &config::AppConfig, line_map: &LineIdMap) -> Scope {
    match scope {
        SyncScope::Line { line_id } => Scope::Line(LineId::new(line_id)),
        SyncScope::Recent { days } => Scope::Recent {
            days: days.unwrap_or(config.sync.recent_window_days),
        },
        SyncScope::Paths { paths } => Scope::Paths(parse_path_targets(line_map, &paths)),
    }
}
