/// Trainer assignment endpoints
///
/// # Endpoints
///
/// - `POST /v1/admin/assignments/backfill` - Assign every member without a trainer
/// - `GET /v1/members/:member_id/trainer` - The member's current trainer

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use fitstudio_shared::{
    assignment::{BackfillEntry, BackfillReport},
    models::{
        account::Account,
        relationship::{AssignedTrainer, MemberTrainerRelationship},
    },
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// One line of the backfill response
#[derive(Debug, Serialize)]
pub struct BackfillResult {
    /// Member account ID
    pub member_id: Uuid,

    /// Member display name
    pub member: String,

    /// Assigned trainer's name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer: Option<String>,

    /// Whether the member now has a trainer
    pub success: bool,

    /// Failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<BackfillEntry> for BackfillResult {
    fn from(entry: BackfillEntry) -> Self {
        Self {
            success: entry.is_success(),
            trainer: entry.trainer().map(str::to_string),
            error: entry.error().map(str::to_string),
            member_id: entry.member_id,
            member: entry.member,
        }
    }
}

/// Backfill response
#[derive(Debug, Serialize)]
pub struct BackfillResponse {
    /// Per-member results, one per member that lacked a trainer
    pub results: Vec<BackfillResult>,

    /// Members assigned by this run
    pub assigned: usize,

    /// Members still without a trainer
    pub failed: usize,

    /// Members skipped because they already had a trainer
    pub skipped: usize,
}

impl From<BackfillReport> for BackfillResponse {
    fn from(report: BackfillReport) -> Self {
        let assigned = report.assigned_count();
        let failed = report.failed_count();

        Self {
            results: report.entries.into_iter().map(BackfillResult::from).collect(),
            assigned,
            failed,
            skipped: report.already_assigned,
        }
    }
}

/// Assign a trainer to every member that lacks one
///
/// Members are processed one at a time; a failure for one member is reported
/// in its result line and does not stop the run. Only a failed member scan
/// fails the request.
///
/// # Endpoint
///
/// ```text
/// POST /v1/admin/assignments/backfill
/// Authorization: Bearer <ADMIN_TOKEN>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "results": [
///     { "member_id": "uuid", "member": "Sam", "trainer": "Alex", "success": true },
///     { "member_id": "uuid", "member": "Kim", "success": false,
///       "error": "No trainers available: All trainers have reached their maximum capacity (15 members)" }
///   ],
///   "assigned": 1,
///   "failed": 1,
///   "skipped": 4
/// }
/// ```
pub async fn backfill(State(state): State<AppState>) -> ApiResult<Json<BackfillResponse>> {
    let report = state.assignments.backfill().await?;
    let response = BackfillResponse::from(report);

    info!(
        assigned = response.assigned,
        failed = response.failed,
        skipped = response.skipped,
        "Backfill request completed"
    );

    Ok(Json(response))
}

/// Member trainer response
#[derive(Debug, Serialize)]
pub struct MemberTrainerResponse {
    /// Member account ID
    pub member_id: Uuid,

    /// Active trainer, `null` when unassigned
    pub trainer: Option<AssignedTrainer>,
}

/// Get the member's current trainer
///
/// # Errors
///
/// - `404 Not Found`: No member account with this ID
pub async fn member_trainer(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> ApiResult<Json<MemberTrainerResponse>> {
    let member = Account::find_by_id(&state.db, member_id)
        .await?
        .filter(Account::is_member)
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    let trainer = MemberTrainerRelationship::find_assigned_trainer(&state.db, member.id).await?;

    Ok(Json(MemberTrainerResponse {
        member_id: member.id,
        trainer,
    }))
}
