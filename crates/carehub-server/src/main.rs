//! carehub server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, serves the JSON API over HTTP and keeps next
//! week's shifts materialized in the background.
//!
//! # One-shot mode
//!
//! For hosts that prefer cron over a long-running poller:
//!
//! ```text
//! carehub --config /etc/carehub.toml --materialize-once
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use carehub_api::ApiState;
use carehub_core::SnapshotTrigger;
use carehub_server::{ServerConfig, poller};
use carehub_store_sqlite::SqliteStore;
use chrono::Local;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Carehub shift scheduling server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run a single materialization pass for every family and exit.
  #[arg(long)]
  materialize_once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // INFO unless RUST_LOG says otherwise.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // File settings, overridden by CAREHUB_* environment variables.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CAREHUB"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  // One-shot mode: a fresh trigger runs every family once.
  if cli.materialize_once {
    let mut trigger = SnapshotTrigger::new();
    let today = Local::now().date_naive();
    let passes =
      poller::poll_once(&*store, server_cfg.week_start, &mut trigger, today).await;
    tracing::info!(passes, "one-shot materialization finished");
    return Ok(());
  }

  tokio::spawn(poller::run(
    Arc::clone(&store),
    server_cfg.week_start,
    Duration::from_secs(server_cfg.poll_interval_secs.max(1)),
  ));

  let app = carehub_server::router(ApiState::new(store, server_cfg.week_start));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
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
