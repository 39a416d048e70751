//! Handlers for assignment endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/families` | Families owning at least one assignment |
//! | `GET`   | `/families/:family_id/assignments` | Oldest first |
//! | `POST`  | `/families/:family_id/assignments` | Body: [`NewAssignment`]; returns 201 |
//! | `GET`   | `/assignments/:id` | 404 if not found |
//! | `PATCH` | `/assignments/:id` | Body: `{"active":false}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use carehub_core::{AssignmentId, NewAssignment, ShiftAssignment, store::ScheduleStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, Backend, error::ApiError};

// ─── Families ─────────────────────────────────────────────────────────────────

/// `GET /families`
pub async fn list_families<S: Backend>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Uuid>>, ApiError> {
  let families = state.store.list_families().await.map_err(ApiError::store)?;
  Ok(Json(families))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /families/:family_id/assignments`
pub async fn list<S: Backend>(
  State(state): State<ApiState<S>>,
  Path(family_id): Path<Uuid>,
) -> Result<Json<Vec<ShiftAssignment>>, ApiError> {
  let assignments = state
    .store
    .list_assignments(family_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(assignments))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /families/:family_id/assignments`
pub async fn create<S: Backend>(
  State(state): State<ApiState<S>>,
  Path(family_id): Path<Uuid>,
  Json(mut input): Json<NewAssignment>,
) -> Result<impl IntoResponse, ApiError> {
  // The path decides the family, whatever the body says.
  input.family_id = family_id;
  input
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let assignment = state
    .store
    .create_assignment(input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(assignment)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /assignments/:id`
pub async fn get_one<S: Backend>(
  State(state): State<ApiState<S>>,
  Path(id): Path<AssignmentId>,
) -> Result<Json<ShiftAssignment>, ApiError> {
  let assignment = state
    .store
    .get_assignment(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("assignment {id} not found")))?;
  Ok(Json(assignment))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub active: bool,
}

/// `PATCH /assignments/:id`, body: `{"active":false}`
pub async fn update<S: Backend>(
  State(state): State<ApiState<S>>,
  Path(id): Path<AssignmentId>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<ShiftAssignment>, ApiError> {
  let assignment = state
    .store
    .set_assignment_active(&id, body.active)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("assignment {id} not found")))?;
  Ok(Json(assignment))
}
