//! JSON REST API for Carehub.
//!
//! Exposes an axum [`Router`] backed by any store implementing the traits in
//! [`carehub_core::store`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", carehub_api::api_router(state))
//! ```

pub mod assignments;
pub mod error;
pub mod instances;
pub mod materialize;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use carehub_core::{
  WeekStart,
  store::{InstanceGenerator, InstanceQuery, ScheduleStore},
};
use chrono::{Datelike as _, Local, NaiveDate};

pub use error::ApiError;

/// Everything a backend must provide to serve the API.
pub trait Backend: ScheduleStore + InstanceQuery + InstanceGenerator + 'static {}

impl<T> Backend for T where T: ScheduleStore + InstanceQuery + InstanceGenerator + 'static {}

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:      Arc<S>,
  pub week_start: WeekStart,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, week_start: WeekStart) -> Self { Self { store, week_start } }

  /// The server's local calendar date.
  pub fn today(&self) -> NaiveDate { Local::now().date_naive() }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), week_start: self.week_start }
  }
}

/// Reject a date query parameter the store cannot represent: anything outside
/// years 1 to 9999.
pub(crate) fn check_date(param: &str, date: NaiveDate) -> Result<NaiveDate, ApiError> {
  if (1..=9999).contains(&date.year()) {
    Ok(date)
  } else {
    Err(ApiError::BadRequest(format!("{param} ({date}) must fall within years 1 to 9999")))
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S: Backend>(state: ApiState<S>) -> Router<()> {
  Router::new()
    // Families
    .route("/families", get(assignments::list_families::<S>))
    .route(
      "/families/{family_id}/assignments",
      get(assignments::list::<S>).post(assignments::create::<S>),
    )
    .route("/families/{family_id}/materialize", post(materialize::run::<S>))
    // Assignments
    .route(
      "/assignments/{id}",
      get(assignments::get_one::<S>).patch(assignments::update::<S>),
    )
    .route("/assignments/{id}/instances", get(instances::list::<S>))
    .with_state(state)
}
