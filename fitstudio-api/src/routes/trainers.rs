/// Trainer dashboard endpoints
///
/// # Endpoints
///
/// - `GET /v1/trainers` - Every trainer's load against the capacity ceiling
/// - `GET /v1/trainers/:trainer_id/members` - A trainer's active roster

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use fitstudio_shared::{
    assignment::TrainerCapacity,
    models::{
        account::{Account, AccountRole},
        relationship::{MemberTrainerRelationship, RosterEntry},
    },
};
use serde::Serialize;
use uuid::Uuid;

/// Capacity overview response
#[derive(Debug, Serialize)]
pub struct TrainerListResponse {
    /// Trainers in scan order with their current load
    pub trainers: Vec<TrainerCapacity>,
}

/// List trainers with their load
///
/// # Response
///
/// ```json
/// {
///   "trainers": [
///     { "trainer": { "id": "uuid", "full_name": "Alex", ... },
///       "active_members": 12, "capacity": 15, "slots_remaining": 3, "at_capacity": false }
///   ]
/// }
/// ```
pub async fn list_trainers(State(state): State<AppState>) -> ApiResult<Json<TrainerListResponse>> {
    let trainers = state.assignments.capacity_overview().await?;
    Ok(Json(TrainerListResponse { trainers }))
}

/// Roster response
#[derive(Debug, Serialize)]
pub struct RosterResponse {
    /// Trainer account
    pub trainer: Account,

    /// Active members
    pub members: Vec<RosterEntry>,

    /// Active member count
    pub active_members: usize,

    /// Capacity ceiling
    pub capacity: i64,
}

/// List a trainer's active members
///
/// # Errors
///
/// - `404 Not Found`: No trainer account with this ID
pub async fn list_members(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
) -> ApiResult<Json<RosterResponse>> {
    let trainer = Account::find_by_id(&state.db, trainer_id)
        .await?
        .filter(|account| account.role == AccountRole::Trainer)
        .ok_or_else(|| ApiError::NotFound("Trainer not found".to_string()))?;

    let members = MemberTrainerRelationship::list_roster(&state.db, trainer.id).await?;

    Ok(Json(RosterResponse {
        active_members: members.len(),
        capacity: state.assignments.capacity(),
        trainer,
        members,
    }))
}
