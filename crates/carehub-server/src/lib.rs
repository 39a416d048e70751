//! Hosting layer for Carehub: configuration, the HTTP router, and the
//! polling trigger that keeps upcoming shifts materialized.

pub mod poller;

use std::path::PathBuf;

use axum::Router;
use carehub_api::{ApiState, Backend};
use carehub_core::WeekStart;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CAREHUB_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  pub store_path:         PathBuf,
  /// First day of the week used to compute the upcoming week.
  #[serde(default)]
  pub week_start:         WeekStart,
  /// Seconds between polls of the assignment snapshot.
  #[serde(default = "default_poll_interval_secs")]
  pub poll_interval_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_poll_interval_secs() -> u64 { 300 }

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API nested under `/api`, with request tracing.
pub fn router<S: Backend>(state: ApiState<S>) -> Router {
  Router::new()
    .nest("/api", carehub_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}
