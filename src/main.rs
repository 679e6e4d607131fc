use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use colloquia::config::Config;
use colloquia::store::MemoryStore;
use colloquia::vocab::Vocabulary;
use colloquia::web::{router, ApiState};

#[derive(Parser, Debug)]
#[command(name = "colloquia", about = "Seminar and talk directory service", version)]
struct Cli {
    /// Path to a TOML config file; standard locations are tried otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// JSON seed file to load into the in-memory store.
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load()?,
    };

    let store = match &cli.seed {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading seed file {}", path.display()))?;
            let store = MemoryStore::from_seed_json(&json).await?;
            tracing::info!("Loaded seed data from {}", path.display());
            store
        }
        None => MemoryStore::new(),
    };

    let mode = config.deployment.mode();
    tracing::info!("Deployment mode: {mode:?}");

    let state = ApiState::new(Arc::new(store), mode, Vocabulary::builtin());
    let app = router(state);

    let addr = match cli.bind {
        Some(addr) => addr,
        None => config.server.bind_addr()?,
    };
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
