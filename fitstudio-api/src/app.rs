/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use fitstudio_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = fitstudio_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use fitstudio_shared::assignment::{AssignmentService, PgAssignmentStore};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Trainer assignment over the same pool
    pub assignments: Arc<AssignmentService<PgAssignmentStore>>,
}

impl AppState {
    /// Creates new application state
    ///
    /// The assignment store shares `db` and is bounded by the configured
    /// per-call timeout.
    pub fn new(db: PgPool, config: Config) -> Self {
        let store = PgAssignmentStore::new(db.clone()).with_call_timeout(config.store_call_timeout());

        Self {
            db,
            config: Arc::new(config),
            assignments: Arc::new(AssignmentService::new(store)),
        }
    }

    /// Admin bearer token, if admin routes are protected
    pub fn admin_token(&self) -> Option<&str> {
        self.config.admin.token.as_deref()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/
///     ├── /accounts/
///     │   └── POST /register           # Register, auto-assign members
///     ├── /admin/                      # Admin token when configured
///     │   └── POST /assignments/backfill
///     ├── /trainers/
///     │   ├── GET /                    # Capacity overview
///     │   └── GET /:trainer_id/members # Roster
///     └── /members/
///         └── GET /:member_id/trainer  # Assigned trainer
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Response compression (gzip/brotli)
/// 4. Admin token (admin routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let account_routes = Router::new().route("/register", post(routes::accounts::register));

    let admin_routes = Router::new()
        .route(
            "/assignments/backfill",
            post(routes::assignments::backfill),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_auth_layer,
        ));

    let trainer_routes = Router::new()
        .route("/", get(routes::trainers::list_trainers))
        .route("/:trainer_id/members", get(routes::trainers::list_members));

    let member_routes =
        Router::new().route("/:member_id/trainer", get(routes::assignments::member_trainer));

    let v1_routes = Router::new()
        .nest("/accounts", account_routes)
        .nest("/admin", admin_routes)
        .nest("/trainers", trainer_routes)
        .nest("/members", member_routes);

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(CompressionLayer::new())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Admin token middleware layer
///
/// Passes everything through when no `ADMIN_TOKEN` is configured.
/// Otherwise expects `Authorization: Bearer <token>`.
async fn admin_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_token() else {
        return Ok(next.run(req).await);
    };

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        warn!(path = %req.uri().path(), "Rejected admin request with invalid token");
        return Err(ApiError::Forbidden("Invalid admin token".to_string()));
    }

    Ok(next.run(req).await)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
