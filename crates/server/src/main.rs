use anyhow::Context;
use clap::Parser;
use pl_database::init::{init_db, DbSettings};
use pl_database::{MemoryStore, PgStore, PriceStore};
use pl_server::{router, AppState, ServerConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pl-server", about = "Price list upload/export service")]
struct Cli {
    /// Listen port; overrides APP_PORT.
    #[arg(long)]
    port: Option<u16>,
    /// Keep prices in process memory instead of Postgres (data is lost on exit).
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .compact()
        .init();

    // Load environment from .env if present
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let store: Arc<dyn PriceStore> = if cli.memory {
        warn!("using in-memory price store; uploads will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let settings = DbSettings::from_env()?;
        let pool = init_db(&settings)?;
        let store = PgStore::new(pool)
            .await
            .context("failed to prepare the prices schema")?;
        info!(max_conns = settings.max_connections, "connected to Postgres");
        Arc::new(store)
    };

    let app = router(AppState::new(store).with_max_upload_bytes(config.max_upload_bytes));
    let listener = TcpListener::bind((config.bind.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.bind, config.port))?;
    info!(addr = %listener.local_addr()?, "price list server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
