/// Store seam for the assignment core
///
/// The assignment algorithms never talk to the database directly. They go
/// through [`AssignmentStore`], which carries exactly the four operations
/// they need. [`PgAssignmentStore`](super::postgres::PgAssignmentStore) backs
/// it with PostgreSQL; [`InMemoryAssignmentStore`](super::memory::InMemoryAssignmentStore)
/// backs it with plain collections for tests.
///
/// # Example
///
/// ```no_run
/// use fitstudio_shared::assignment::{AssignmentStore, StoreResult};
/// use fitstudio_shared::models::account::{Account, AccountRole};
/// use fitstudio_shared::models::relationship::MemberTrainerRelationship;
/// use async_trait::async_trait;
/// use uuid::Uuid;
///
/// struct EmptyStore;
///
/// #[async_trait]
/// impl AssignmentStore for EmptyStore {
///     async fn select_accounts(&self, _role: AccountRole) -> StoreResult<Vec<Account>> {
///         Ok(Vec::new())
///     }
///
///     async fn count_active_relationships(&self, _trainer_id: Uuid) -> StoreResult<i64> {
///         Ok(0)
///     }
///
///     async fn insert_relationship(
///         &self,
///         _member_id: Uuid,
///         _trainer_id: Uuid,
///     ) -> StoreResult<MemberTrainerRelationship> {
///         unimplemented!()
///     }
///
///     async fn find_active_relationship(
///         &self,
///         _member_id: Uuid,
///     ) -> StoreResult<Option<MemberTrainerRelationship>> {
///         Ok(None)
///     }
/// }
/// ```

use super::error::StoreResult;
use crate::models::{account::{Account, AccountRole}, relationship::MemberTrainerRelationship};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Data access needed by trainer assignment
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// All accounts with the given role, in the store's scan order
    async fn select_accounts(&self, role: AccountRole) -> StoreResult<Vec<Account>>;

    /// Number of active relationships referencing the trainer
    async fn count_active_relationships(&self, trainer_id: Uuid) -> StoreResult<i64>;

    /// Persists a new active relationship stamped with the current time
    async fn insert_relationship(
        &self,
        member_id: Uuid,
        trainer_id: Uuid,
    ) -> StoreResult<MemberTrainerRelationship>;

    /// The member's active relationship, if one exists
    async fn find_active_relationship(
        &self,
        member_id: Uuid,
    ) -> StoreResult<Option<MemberTrainerRelationship>>;
}

#[async_trait]
impl<T: AssignmentStore + ?Sized> AssignmentStore for Arc<T> {
    async fn select_accounts(&self, role: AccountRole) -> StoreResult<Vec<Account>> {
        (**self).select_accounts(role).await
    }

    async fn count_active_relationships(&self, trainer_id: Uuid) -> StoreResult<i64> {
        (**self).count_active_relationships(trainer_id).await
    }

    async fn insert_relationship(
        &self,
        member_id: Uuid,
        trainer_id: Uuid,
    ) -> StoreResult<MemberTrainerRelationship> {
        (**self).insert_relationship(member_id, trainer_id).await
    }

    async fn find_active_relationship(
        &self,
        member_id: Uuid,
    ) -> StoreResult<Option<MemberTrainerRelationship>> {
        (**self).find_active_relationship(member_id).await
    }
}
