//! fittrack-server binary.
//!
//! Reads `fittrack.toml` (or the path given with `--config`) layered under
//! `FITTRACK_*` environment variables, opens the configured store once, and
//! serves the JSON API over HTTP until interrupted. The store is closed on
//! shutdown.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use fittrack_core::{memory::MemoryStore, store::DocumentStore};
use fittrack_server::{AppState, ServerConfig, StoreBackend};
use fittrack_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "fittrack API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "fittrack.toml")]
  config: PathBuf,

  /// Override the configured storage backend.
  #[arg(long)]
  backend: Option<StoreBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FITTRACK").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  if let Some(backend) = cli.backend {
    server_cfg.store_backend = backend;
  }

  match server_cfg.store_backend {
    StoreBackend::Sqlite => {
      let store_path = expand_tilde(&server_cfg.store_path);
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store at {store_path:?}"))?;
      tracing::info!(path = ?store_path, "opened sqlite store");
      serve(store, server_cfg).await
    }
    StoreBackend::Memory => {
      tracing::warn!("using in-memory store; data is lost on exit");
      serve(MemoryStore::new(), server_cfg).await
    }
  }
}

async fn serve<S>(store: S, server_cfg: ServerConfig) -> anyhow::Result<()>
where
  S: DocumentStore + 'static,
{
  let store = Arc::new(store);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = fittrack_server::router(AppState::new(Arc::clone(&store), server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  store.close().await.context("failed to close store")?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
