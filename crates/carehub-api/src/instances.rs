//! Handler for `GET /assignments/:id/instances`.
//!
//! `?from=YYYY-MM-DD&to=YYYY-MM-DD`, both inclusive. Either bound defaults to
//! the corresponding edge of the upcoming week. Bounds outside years 1 to 9999
//! are a 400.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use carehub_core::{AssignmentId, ShiftInstance, WeekWindow, store::ScheduleStore};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{ApiState, Backend, check_date, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

/// `GET /assignments/:id/instances[?from=...][&to=...]`
pub async fn list<S: Backend>(
  State(state): State<ApiState<S>>,
  Path(id): Path<AssignmentId>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ShiftInstance>>, ApiError> {
  let upcoming = WeekWindow::upcoming(state.today(), state.week_start);
  let from = bound("from", params.from, upcoming.map(|w| w.start))?;
  let to = bound("to", params.to, upcoming.map(|w| w.end))?;
  if from > to {
    return Err(ApiError::BadRequest(format!("from ({from}) is after to ({to})")));
  }

  state
    .store
    .get_assignment(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("assignment {id} not found")))?;

  let instances = state
    .store
    .list_instances(&id, from, to)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(instances))
}

fn bound(
  param:    &str,
  given:    Option<NaiveDate>,
  fallback: Option<NaiveDate>,
) -> Result<NaiveDate, ApiError> {
  match given.or(fallback) {
    Some(date) => check_date(param, date),
    None => Err(ApiError::BadRequest(format!("{param} is required"))),
  }
}
