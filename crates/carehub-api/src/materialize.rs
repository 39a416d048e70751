//! Handler for `POST /families/:family_id/materialize`.
//!
//! Runs one materialization pass over the family's current assignments and
//! returns the [`PassReport`]. `?today=YYYY-MM-DD` overrides the server date.
//! Per-assignment failures are part of the report, never an error response.
//! A `today` outside years 1 to 9999 is a 400.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use carehub_core::{Materializer, PassReport, store::ScheduleStore};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, Backend, check_date, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct MaterializeParams {
  pub today: Option<NaiveDate>,
}

/// `POST /families/:family_id/materialize[?today=...]`
pub async fn run<S: Backend>(
  State(state): State<ApiState<S>>,
  Path(family_id): Path<Uuid>,
  Query(params): Query<MaterializeParams>,
) -> Result<Json<PassReport>, ApiError> {
  let today = match params.today {
    Some(date) => check_date("today", date)?,
    None => state.today(),
  };

  let assignments = state
    .store
    .list_assignments(family_id)
    .await
    .map_err(ApiError::store)?;

  let report = Materializer::new(&*state.store, &*state.store)
    .with_week_start(state.week_start)
    .materialize_upcoming_week(&assignments, today)
    .await;

  Ok(Json(report))
}
