/// Account registration
///
/// # Endpoints
///
/// - `POST /v1/accounts/register` - Create an account; members are assigned
///   a trainer immediately

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use fitstudio_shared::{
    auth::password,
    models::account::{Account, AccountRole, CreateAccount},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub full_name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Member or trainer
    pub role: AccountRole,
}

impl RegisterRequest {
    /// Trims surrounding whitespace from the name and email
    ///
    /// Runs before validation so the length rules apply to what is stored.
    pub fn normalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// The created account
    pub account: Account,

    /// Outcome of automatic trainer assignment; absent for trainers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_message: Option<String>,
}

/// Register a new account
///
/// The account is created first. For members, a trainer is then assigned
/// through the assignment service. The assignment outcome is reported in
/// `assignment_message` and never changes the response status: a member
/// registered while every trainer is full is still registered.
///
/// # Endpoint
///
/// ```text
/// POST /v1/accounts/register
/// Content-Type: application/json
///
/// {
///   "full_name": "Sam Member",
///   "email": "sam@example.com",
///   "password": "SecureP@ss123",
///   "role": "member"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "account": { "id": "uuid", "full_name": "Sam Member", "email": "sam@example.com", "role": "member", "created_at": "..." },
///   "assignment_message": "Successfully assigned to trainer: Alex Trainer"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let req = req.normalized();
    req.validate()?;

    password::validate_password_strength(&req.password)
        .map_err(|e| ApiError::invalid_field("password", e))?;

    let password_hash = password::hash_password(&req.password)?;

    let account = Account::create(
        &state.db,
        CreateAccount {
            full_name: req.full_name,
            email: req.email,
            password_hash,
            role: req.role,
        },
    )
    .await?;

    info!(
        account_id = %account.id,
        role = account.role.as_str(),
        "Account registered"
    );

    let outcome = state.assignments.auto_assign(&account).await;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            assignment_message: outcome.message(),
            account,
        }),
    ))
}
