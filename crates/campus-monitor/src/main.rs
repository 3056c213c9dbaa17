//! campus-monitor server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), seeds an
//! in-memory asset store, starts the derivation session, and serves the JSON
//! API over HTTP until interrupted.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use campus_core::time::{Clock, SystemClock};
use campus_session::Session;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Campus asset monitor")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Seed file, overriding `seed_path` from the configuration.
  #[arg(long)]
  seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut cfg = campus_monitor::load_config(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
  if let Some(seed) = cli.seed {
    cfg.seed_path = Some(seed);
  }

  let clock: Arc<dyn Clock> = Arc::new(SystemClock);
  let store = campus_monitor::open_store(cfg.seed_path.as_deref(), Arc::clone(&clock))
    .await
    .context("failed to open store")?;

  let session = Session::spawn(Arc::new(store), cfg.session.clone(), clock)
    .await
    .context("failed to start session")?;

  let app = campus_monitor::router(session.client());
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  session.shutdown().await;
  tracing::info!("stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
}
