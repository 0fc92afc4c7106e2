/// PostgreSQL-backed assignment store
///
/// Every call is bounded by a per-call timeout. A call that exceeds it is
/// abandoned and reported as [`StoreError::Timeout`], which the assignment
/// core treats like any other store failure.
///
/// # Example
///
/// ```no_run
/// use fitstudio_shared::assignment::{AssignmentService, PgAssignmentStore};
/// use fitstudio_shared::db::pool::{create_pool, DatabaseConfig};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let store = PgAssignmentStore::new(pool).with_call_timeout(Duration::from_secs(2));
/// let service = AssignmentService::new(store);
///
/// let report = service.backfill().await?;
/// println!("Assigned {} members", report.assigned_count());
/// # Ok(())
/// # }
/// ```

use super::error::{StoreError, StoreResult};
use super::store::AssignmentStore;
use crate::models::{
    account::{Account, AccountRole},
    relationship::MemberTrainerRelationship,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// Default bound on a single store call (5 seconds)
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Assignment store over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgAssignmentStore {
    pool: PgPool,
    call_timeout: Duration,
}

impl PgAssignmentStore {
    /// Creates a store with the default call timeout
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Overrides the per-call timeout
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Configured per-call timeout
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(StoreError::Timeout(self.call_timeout))
            }
        }
    }
}

#[async_trait]
impl AssignmentStore for PgAssignmentStore {
    async fn select_accounts(&self, role: AccountRole) -> StoreResult<Vec<Account>> {
        self.bounded("select_accounts", Account::list_by_role(&self.pool, role))
            .await
    }

    async fn count_active_relationships(&self, trainer_id: Uuid) -> StoreResult<i64> {
        self.bounded(
            "count_active_relationships",
            MemberTrainerRelationship::count_active_by_trainer(&self.pool, trainer_id),
        )
        .await
    }

    async fn insert_relationship(
        &self,
        member_id: Uuid,
        trainer_id: Uuid,
    ) -> StoreResult<MemberTrainerRelationship> {
        self.bounded(
            "insert_relationship",
            MemberTrainerRelationship::create_active(&self.pool, member_id, trainer_id),
        )
        .await
    }

    async fn find_active_relationship(
        &self,
        member_id: Uuid,
    ) -> StoreResult<Option<MemberTrainerRelationship>> {
        self.bounded(
            "find_active_relationship",
            MemberTrainerRelationship::find_active_by_member(&self.pool, member_id),
        )
        .await
    }
}
