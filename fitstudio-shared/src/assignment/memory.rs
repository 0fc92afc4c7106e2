/// In-memory assignment store for tests and demos
///
/// Keeps accounts and relationships in insertion order so scans are
/// deterministic. Individual operations can be made to fail to exercise the
/// assignment core's failure handling:
///
/// - [`fail_account_scan`](InMemoryAssignmentStore::fail_account_scan): `select_accounts` for a role
/// - [`fail_count_for`](InMemoryAssignmentStore::fail_count_for): `count_active_relationships` for one trainer
/// - [`fail_lookup_for`](InMemoryAssignmentStore::fail_lookup_for): `find_active_relationship` for one member
/// - [`fail_insert_for`](InMemoryAssignmentStore::fail_insert_for): `insert_relationship` for one member
///
/// Like the `uniq_active_relationship_per_member` index, an insert for a
/// member who already has an active relationship is rejected.
///
/// # Example
///
/// ```
/// use fitstudio_shared::assignment::{AssignmentService, InMemoryAssignmentStore};
///
/// # async fn example() {
/// let store = InMemoryAssignmentStore::new();
/// let trainer = store.add_trainer("Alex Trainer");
/// let member = store.add_member("Sam Member");
///
/// let service = AssignmentService::new(store);
/// let outcome = service.auto_assign(&member).await;
/// assert_eq!(
///     outcome.message().as_deref(),
///     Some("Successfully assigned to trainer: Alex Trainer")
/// );
/// assert_eq!(service.store().active_count(trainer.id), 1);
/// # }
/// ```

use super::error::{StoreError, StoreResult};
use super::store::AssignmentStore;
use crate::models::{
    account::{Account, AccountRole},
    relationship::{MemberTrainerRelationship, RelationshipStatus},
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    accounts: Vec<Account>,
    relationships: Vec<MemberTrainerRelationship>,
    failing_scans: HashSet<AccountRole>,
    failing_counts: HashSet<Uuid>,
    failing_lookups: HashSet<Uuid>,
    failing_inserts: HashSet<Uuid>,
    insert_calls: usize,
}

/// Assignment store held entirely in process memory
#[derive(Debug, Default)]
pub struct InMemoryAssignmentStore {
    inner: Mutex<Inner>,
}

impl InMemoryAssignmentStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock only happens in a failing test
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn add_account(&self, full_name: &str, role: AccountRole) -> Account {
        let mut inner = self.lock();
        // Space creation times apart so scan order matches insertion order
        let offset = Duration::seconds(inner.accounts.len() as i64);
        let account = Account {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: format!(
                "{}@studio.test",
                full_name.to_lowercase().replace(' ', ".")
            ),
            role,
            created_at: Utc::now() + offset,
        };
        inner.accounts.push(account.clone());
        account
    }

    /// Adds a trainer account
    pub fn add_trainer(&self, full_name: &str) -> Account {
        self.add_account(full_name, AccountRole::Trainer)
    }

    /// Adds a member account
    pub fn add_member(&self, full_name: &str) -> Account {
        self.add_account(full_name, AccountRole::Member)
    }

    /// Seeds a relationship directly, bypassing the uniqueness check
    pub fn seed_relationship(
        &self,
        member_id: Uuid,
        trainer_id: Uuid,
        status: RelationshipStatus,
    ) -> MemberTrainerRelationship {
        let relationship = MemberTrainerRelationship {
            id: Uuid::new_v4(),
            member_id,
            trainer_id,
            status,
            assigned_at: Utc::now(),
            notes: None,
        };
        self.lock().relationships.push(relationship.clone());
        relationship
    }

    /// Gives the trainer `count` active relationships with fresh members
    pub fn seed_load(&self, trainer_id: Uuid, count: usize) {
        for i in 0..count {
            let member = self.add_member(&format!("Seeded Member {}-{}", trainer_id.simple(), i));
            self.seed_relationship(member.id, trainer_id, RelationshipStatus::Active);
        }
    }

    /// Makes `select_accounts` fail for the role
    pub fn fail_account_scan(&self, role: AccountRole) {
        self.lock().failing_scans.insert(role);
    }

    /// Makes `count_active_relationships` fail for the trainer
    pub fn fail_count_for(&self, trainer_id: Uuid) {
        self.lock().failing_counts.insert(trainer_id);
    }

    /// Makes `find_active_relationship` fail for the member
    pub fn fail_lookup_for(&self, member_id: Uuid) {
        self.lock().failing_lookups.insert(member_id);
    }

    /// Makes `insert_relationship` fail for the member
    pub fn fail_insert_for(&self, member_id: Uuid) {
        self.lock().failing_inserts.insert(member_id);
    }

    /// Number of `insert_relationship` calls made, including failed ones
    pub fn insert_calls(&self) -> usize {
        self.lock().insert_calls
    }

    /// Active relationships referencing the trainer
    pub fn active_count(&self, trainer_id: Uuid) -> i64 {
        self.lock()
            .relationships
            .iter()
            .filter(|r| r.trainer_id == trainer_id && r.status == RelationshipStatus::Active)
            .count() as i64
    }

    /// All relationships in insertion order
    pub fn relationships(&self) -> Vec<MemberTrainerRelationship> {
        self.lock().relationships.clone()
    }
}

#[async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn select_accounts(&self, role: AccountRole) -> StoreResult<Vec<Account>> {
        let inner = self.lock();
        if inner.failing_scans.contains(&role) {
            return Err(StoreError::Unavailable(format!(
                "scan of {} accounts failed",
                role.as_str()
            )));
        }

        Ok(inner
            .accounts
            .iter()
            .filter(|a| a.role == role)
            .cloned()
            .collect())
    }

    async fn count_active_relationships(&self, trainer_id: Uuid) -> StoreResult<i64> {
        if self.lock().failing_counts.contains(&trainer_id) {
            return Err(StoreError::Unavailable(format!(
                "count for trainer {} failed",
                trainer_id
            )));
        }

        Ok(self.active_count(trainer_id))
    }

    async fn insert_relationship(
        &self,
        member_id: Uuid,
        trainer_id: Uuid,
    ) -> StoreResult<MemberTrainerRelationship> {
        let mut inner = self.lock();
        inner.insert_calls += 1;

        if inner.failing_inserts.contains(&member_id) {
            return Err(StoreError::Unavailable(format!(
                "insert for member {} failed",
                member_id
            )));
        }

        let already_active = inner
            .relationships
            .iter()
            .any(|r| r.member_id == member_id && r.status == RelationshipStatus::Active);
        if already_active {
            return Err(StoreError::Unavailable(format!(
                "member {} already has an active relationship",
                member_id
            )));
        }

        let relationship = MemberTrainerRelationship {
            id: Uuid::new_v4(),
            member_id,
            trainer_id,
            status: RelationshipStatus::Active,
            assigned_at: Utc::now(),
            notes: None,
        };
        inner.relationships.push(relationship.clone());

        Ok(relationship)
    }

    async fn find_active_relationship(
        &self,
        member_id: Uuid,
    ) -> StoreResult<Option<MemberTrainerRelationship>> {
        let inner = self.lock();
        if inner.failing_lookups.contains(&member_id) {
            return Err(StoreError::Unavailable(format!(
                "lookup for member {} failed",
                member_id
            )));
        }

        Ok(inner
            .relationships
            .iter()
            .find(|r| r.member_id == member_id && r.status == RelationshipStatus::Active)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_select_accounts_filters_by_role_in_insertion_order() {
        let store = InMemoryAssignmentStore::new();
        let t1 = store.add_trainer("Trainer One");
        store.add_member("Member One");
        let t2 = store.add_trainer("Trainer Two");

        let trainers = store.select_accounts(AccountRole::Trainer).await.unwrap();
        let ids: Vec<Uuid> = trainers.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t1.id, t2.id]);
    }

    #[tokio::test]
    async fn test_count_ignores_inactive_relationships() {
        let store = InMemoryAssignmentStore::new();
        let trainer = store.add_trainer("Trainer");
        let a = store.add_member("A");
        let b = store.add_member("B");
        store.seed_relationship(a.id, trainer.id, RelationshipStatus::Active);
        store.seed_relationship(b.id, trainer.id, RelationshipStatus::Completed);

        assert_eq!(store.count_active_relationships(trainer.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_second_active_relationship() {
        let store = InMemoryAssignmentStore::new();
        let trainer = store.add_trainer("Trainer");
        let member = store.add_member("Member");

        store.insert_relationship(member.id, trainer.id).await.unwrap();
        let second = store.insert_relationship(member.id, trainer.id).await;

        assert!(second.is_err());
        assert_eq!(store.insert_calls(), 2);
        assert_eq!(store.active_count(trainer.id), 1);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = InMemoryAssignmentStore::new();
        let trainer = store.add_trainer("Trainer");
        let member = store.add_member("Member");

        store.fail_account_scan(AccountRole::Member);
        store.fail_count_for(trainer.id);
        store.fail_lookup_for(member.id);
        store.fail_insert_for(member.id);

        assert!(store.select_accounts(AccountRole::Member).await.is_err());
        assert!(store.select_accounts(AccountRole::Trainer).await.is_ok());
        assert!(store.count_active_relationships(trainer.id).await.is_err());
        assert!(store.find_active_relationship(member.id).await.is_err());
        assert!(store.insert_relationship(member.id, trainer.id).await.is_err());
        assert!(store.relationships().is_empty());
    }

    #[tokio::test]
    async fn test_seed_load() {
        let store = InMemoryAssignmentStore::new();
        let trainer = store.add_trainer("Trainer");
        store.seed_load(trainer.id, 4);

        assert_eq!(store.active_count(trainer.id), 4);
        assert_eq!(store.select_accounts(AccountRole::Member).await.unwrap().len(), 4);
    }
}
