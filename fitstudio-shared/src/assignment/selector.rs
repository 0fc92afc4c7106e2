/// Trainer load query
///
/// Picks the trainer a new member should go to: the one with the fewest
/// active members among those still under the capacity ceiling.
///
/// # Algorithm
///
/// ```text
/// select_accounts(trainer) ──> none? ──> NoTrainersAvailable
///          │
///          ▼
/// count_active_relationships(t) for every trainer (bounded concurrency)
///          │   count failed? ──> treat as 0 (fail-open)
///          ▼
/// keep count < capacity ──> none left? ──> CapacityExhausted
///          │
///          ▼
/// minimum count, first trainer in scan order wins ties
/// ```
///
/// Load is recomputed from the store on every call.

use super::error::{AssignmentError, AssignmentResult};
use super::store::AssignmentStore;
use super::MAX_MEMBERS_PER_TRAINER;
use crate::models::account::{Account, AccountRole};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

/// Upper bound on per-trainer count queries in flight for one selection
///
/// Must stay below the pool size, or a selection's own counts can time out
/// waiting for connections and read as zero.
pub const MAX_CONCURRENT_COUNTS: usize = 4;

/// A trainer paired with their current active-member count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainerLoad {
    /// Trainer account
    pub trainer: Account,

    /// Active relationships referencing the trainer
    pub active_members: i64,
}

impl TrainerLoad {
    /// Free slots before the trainer reaches `capacity`
    pub fn slots_remaining(&self, capacity: i64) -> i64 {
        (capacity - self.active_members).max(0)
    }

    /// Whether the trainer can take no more members
    pub fn is_at_capacity(&self, capacity: i64) -> bool {
        self.active_members >= capacity
    }
}

/// Computes the active-member count of every trainer
///
/// Trainers come back in the store's scan order. At most
/// [`MAX_CONCURRENT_COUNTS`] per-trainer counts run at once, and results
/// stay aligned with the scan order.
///
/// A trainer whose count cannot be read is reported with zero members
/// rather than dropped, which makes them the most likely next pick.
///
/// # Errors
///
/// - [`AssignmentError::Store`] if the trainer scan fails
/// - [`AssignmentError::NoTrainersAvailable`] if there are no trainers
pub async fn trainer_loads<S>(store: &S) -> AssignmentResult<Vec<TrainerLoad>>
where
    S: AssignmentStore + ?Sized,
{
    let trainers = store.select_accounts(AccountRole::Trainer).await?;
    if trainers.is_empty() {
        return Err(AssignmentError::NoTrainersAvailable);
    }

    let count_calls: Vec<_> = trainers
        .iter()
        .map(|trainer| store.count_active_relationships(trainer.id))
        .collect();

    let counts: Vec<_> = stream::iter(count_calls)
        .buffered(MAX_CONCURRENT_COUNTS)
        .collect()
        .await;

    let loads = trainers
        .into_iter()
        .zip(counts)
        .map(|(trainer, count)| {
            let active_members = count.unwrap_or_else(|err| {
                warn!(
                    trainer_id = %trainer.id,
                    error = %err,
                    "Failed to count members for trainer, treating as unloaded"
                );
                0
            });
            TrainerLoad {
                trainer,
                active_members,
            }
        })
        .collect();

    Ok(loads)
}

/// Selects the least-loaded trainer strictly below `capacity`
///
/// Ties go to the trainer that appears first in `loads`.
///
/// # Errors
///
/// Returns [`AssignmentError::CapacityExhausted`] when every trainer is at
/// or above `capacity` (including when `loads` is empty).
pub fn pick_least_loaded(loads: Vec<TrainerLoad>, capacity: i64) -> AssignmentResult<TrainerLoad> {
    loads
        .into_iter()
        .filter(|load| load.active_members < capacity)
        // min_by_key returns the first of several equal minima
        .min_by_key(|load| load.active_members)
        .ok_or(AssignmentError::CapacityExhausted { capacity })
}

/// Finds the trainer a new member should be assigned to
///
/// Read-only; nothing is written to the store.
///
/// # Errors
///
/// - [`AssignmentError::Store`] if the trainer scan fails
/// - [`AssignmentError::NoTrainersAvailable`] if there are no trainers
/// - [`AssignmentError::CapacityExhausted`] if every trainer is full
pub async fn find_least_loaded_trainer<S>(store: &S) -> AssignmentResult<TrainerLoad>
where
    S: AssignmentStore + ?Sized,
{
    let loads = trainer_loads(store).await?;
    let selected = pick_least_loaded(loads, MAX_MEMBERS_PER_TRAINER)?;

    debug!(
        trainer_id = %selected.trainer.id,
        trainer = %selected.trainer.full_name,
        active_members = selected.active_members,
        capacity = MAX_MEMBERS_PER_TRAINER,
        "Selected least-loaded trainer"
    );

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::error::StoreResult;
    use crate::assignment::memory::InMemoryAssignmentStore;
    use crate::models::relationship::MemberTrainerRelationship;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    /// Delays each count so that later trainers finish first, and records
    /// the most counts seen in flight at once
    struct SlowCountStore {
        inner: InMemoryAssignmentStore,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl AssignmentStore for SlowCountStore {
        async fn select_accounts(&self, role: AccountRole) -> StoreResult<Vec<Account>> {
            self.inner.select_accounts(role).await
        }

        async fn count_active_relationships(&self, trainer_id: Uuid) -> StoreResult<i64> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let count = self.inner.count_active_relationships(trainer_id).await?;
            tokio::time::sleep(Duration::from_millis(50 - count as u64)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(count)
        }

        async fn insert_relationship(
            &self,
            member_id: Uuid,
            trainer_id: Uuid,
        ) -> StoreResult<MemberTrainerRelationship> {
            self.inner.insert_relationship(member_id, trainer_id).await
        }

        async fn find_active_relationship(
            &self,
            member_id: Uuid,
        ) -> StoreResult<Option<MemberTrainerRelationship>> {
            self.inner.find_active_relationship(member_id).await
        }
    }

    fn load(name: &str, active_members: i64) -> TrainerLoad {
        TrainerLoad {
            trainer: Account {
                id: Uuid::new_v4(),
                full_name: name.to_string(),
                email: format!("{}@studio.test", name),
                role: AccountRole::Trainer,
                created_at: Utc::now(),
            },
            active_members,
        }
    }

    #[test]
    fn test_pick_least_loaded_excludes_full_trainers() {
        let loads = vec![load("a", 3), load("b", 7), load("c", 1), load("d", 15)];
        let picked = pick_least_loaded(loads, 15).unwrap();
        assert_eq!(picked.trainer.full_name, "c");
        assert_eq!(picked.active_members, 1);
    }

    #[test]
    fn test_pick_least_loaded_tie_goes_to_first() {
        let loads = vec![load("a", 4), load("b", 2), load("c", 2)];
        let picked = pick_least_loaded(loads, 15).unwrap();
        assert_eq!(picked.trainer.full_name, "b");
    }

    #[test]
    fn test_pick_least_loaded_all_full() {
        let loads = vec![load("a", 15), load("b", 16)];
        let err = pick_least_loaded(loads, 15).unwrap_err();
        assert!(matches!(err, AssignmentError::CapacityExhausted { capacity: 15 }));
    }

    #[test]
    fn test_pick_least_loaded_fourteen_is_still_open() {
        let loads = vec![load("a", 15), load("b", 14)];
        let picked = pick_least_loaded(loads, 15).unwrap();
        assert_eq!(picked.trainer.full_name, "b");
    }

    #[test]
    fn test_slots_remaining() {
        assert_eq!(load("a", 3).slots_remaining(15), 12);
        assert_eq!(load("a", 15).slots_remaining(15), 0);
        assert_eq!(load("a", 17).slots_remaining(15), 0);
        assert!(load("a", 15).is_at_capacity(15));
        assert!(!load("a", 14).is_at_capacity(15));
    }

    #[tokio::test]
    async fn test_trainer_loads_keeps_scan_order() {
        let store = InMemoryAssignmentStore::new();
        let a = store.add_trainer("A");
        let b = store.add_trainer("B");
        store.seed_load(a.id, 2);
        store.seed_load(b.id, 5);

        let loads = trainer_loads(&store).await.unwrap();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[0].trainer.id, a.id);
        assert_eq!(loads[0].active_members, 2);
        assert_eq!(loads[1].trainer.id, b.id);
        assert_eq!(loads[1].active_members, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trainer_loads_bounds_concurrent_counts() {
        let store = SlowCountStore {
            inner: InMemoryAssignmentStore::new(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        let trainers: Vec<Account> = (0..12)
            .map(|i| {
                let trainer = store.inner.add_trainer(&format!("T{}", i));
                store.inner.seed_load(trainer.id, i);
                trainer
            })
            .collect();

        let loads = trainer_loads(&store).await.unwrap();

        assert_eq!(loads.len(), trainers.len());
        for (i, (load, trainer)) in loads.iter().zip(&trainers).enumerate() {
            assert_eq!(load.trainer.id, trainer.id);
            assert_eq!(load.active_members, i as i64);
        }
        assert!(store.peak.load(Ordering::SeqCst) <= MAX_CONCURRENT_COUNTS);
        assert!(store.peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_count_failure_fails_open() {
        let store = InMemoryAssignmentStore::new();
        let healthy = store.add_trainer("Healthy");
        let broken = store.add_trainer("Broken");
        store.seed_load(healthy.id, 1);
        store.seed_load(broken.id, 15);
        store.fail_count_for(broken.id);

        let picked = find_least_loaded_trainer(&store).await.unwrap();
        assert_eq!(picked.trainer.id, broken.id);
        assert_eq!(picked.active_members, 0);
    }

    #[tokio::test]
    async fn test_trainer_scan_failure_is_store_error() {
        let store = InMemoryAssignmentStore::new();
        store.add_trainer("Trainer");
        store.fail_account_scan(AccountRole::Trainer);

        let err = find_least_loaded_trainer(&store).await.unwrap_err();
        assert!(err.is_store_error());
    }

    #[tokio::test]
    async fn test_no_trainers() {
        let store = InMemoryAssignmentStore::new();
        store.add_member("Lonely Member");

        let err = find_least_loaded_trainer(&store).await.unwrap_err();
        assert!(matches!(err, AssignmentError::NoTrainersAvailable));
    }
}
