// LiftKey - Web Server
// REST API over the card vault, plus the bridge endpoint platform automations call

use anyhow::{Context, Result};
use clap::Parser;
use liftkey::api::{create_router, AppState};
use liftkey::logging::{init_logging, LogFormat, LogTarget};
use liftkey::{shortcut_url, Config, SqliteStorage, VaultStore};
use std::path::PathBuf;

/// LiftKey vault API server
#[derive(Parser, Debug)]
#[command(name = "liftkey-server", version, about = "LiftKey vault API server")]
struct ServerArgs {
    /// Path to the vault database
    #[arg(long, short = 'd', env = "LIFTKEY_DB")]
    db: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "LIFTKEY_BIND")]
    bind: Option<String>,

    /// Log format: pretty or json
    #[arg(long, env = "LIFTKEY_LOG_FORMAT")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    let mut config = Config::from_env();
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(format) = args.log_format {
        config.log_format = LogFormat::from_str_lossy(&format);
    }

    init_logging("liftkey=info,tower_http=debug", config.log_format, LogTarget::Stderr)
        .context("Failed to initialize logging")?;

    // Vault and bridge inbox share one database file, on separate connections
    let storage = SqliteStorage::open(&config.db_path, &config.storage_key)
        .with_context(|| format!("Failed to open database at {:?}", config.db_path))?;
    let vault = VaultStore::open(storage);
    let bridge = SqliteStorage::open(&config.db_path, &config.storage_key)
        .context("Failed to open bridge inbox")?;

    tracing::info!(db = ?config.db_path, cards = vault.len(), "vault opened");

    let state = AppState::new(vault, Box::new(bridge), &config.bridge_base_url);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "server running");
    tracing::info!(
        shortcut = %shortcut_url(&config.bridge_base_url),
        "bridge shortcut URL"
    );

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
