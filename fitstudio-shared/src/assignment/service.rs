/// Member-to-trainer assignment service
///
/// Wraps an [`AssignmentStore`] and exposes the three assignment flows:
///
/// - [`assign_member`](AssignmentService::assign_member): create one active relationship
/// - [`auto_assign`](AssignmentService::auto_assign): best-effort assignment right after registration
/// - [`backfill`](AssignmentService::backfill): assign every member who has no active trainer
///
/// # Failure Policy
///
/// `assign_member` returns its errors. `auto_assign` never fails: every
/// outcome, including errors, becomes an [`AutoAssignOutcome`] whose message
/// is attached to the registration response. `backfill` only fails when the
/// member scan itself fails; individual member failures are recorded in the
/// report and processing moves on to the next member.
///
/// # Concurrency
///
/// Backfill assigns members one at a time. Running assignments concurrently
/// would let two check-then-insert sequences pick the same trainer and push
/// them past the ceiling.

use super::error::{AssignmentError, AssignmentResult};
use super::selector::{find_least_loaded_trainer, trainer_loads, TrainerLoad};
use super::store::AssignmentStore;
use super::MAX_MEMBERS_PER_TRAINER;
use crate::models::{
    account::{Account, AccountRole},
    relationship::MemberTrainerRelationship,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Result of assigning a trainer to a freshly registered account
#[derive(Debug)]
pub enum AutoAssignOutcome {
    /// The account is not a member; nothing was attempted
    Skipped,

    /// The member was assigned
    Assigned {
        /// Selected trainer
        trainer: Account,

        /// Created relationship
        relationship: MemberTrainerRelationship,

        /// Trainer's active members after this assignment
        active_members: i64,
    },

    /// No trainer could be selected
    NoTrainer(AssignmentError),

    /// A trainer was selected but the relationship could not be stored
    AssignFailed {
        /// Selected trainer
        trainer: Account,

        /// Why the insert failed
        error: AssignmentError,
    },
}

impl AutoAssignOutcome {
    /// Human-readable message for the registration response
    ///
    /// `None` when the account was skipped.
    pub fn message(&self) -> Option<String> {
        match self {
            AutoAssignOutcome::Skipped => None,
            AutoAssignOutcome::Assigned { trainer, .. } => Some(format!(
                "Successfully assigned to trainer: {}",
                trainer.full_name
            )),
            AutoAssignOutcome::NoTrainer(err) => Some(format!("No trainers available: {}", err)),
            AutoAssignOutcome::AssignFailed { error, .. } => {
                Some(format!("Failed to assign trainer: {}", error))
            }
        }
    }

    /// Whether a relationship was created
    pub fn is_assigned(&self) -> bool {
        matches!(self, AutoAssignOutcome::Assigned { .. })
    }
}

/// Outcome for one member processed by backfill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackfillOutcome {
    /// Member now has an active trainer
    Assigned {
        /// Trainer account ID
        trainer_id: Uuid,

        /// Trainer display name
        trainer: String,
    },

    /// Member is still without a trainer
    Failed {
        /// Reason, suitable for display
        error: String,
    },
}

/// One line of the backfill report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillEntry {
    /// Member account ID
    pub member_id: Uuid,

    /// Member display name
    pub member: String,

    /// What happened to this member
    #[serde(flatten)]
    pub outcome: BackfillOutcome,
}

impl BackfillEntry {
    /// Whether the member was assigned
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BackfillOutcome::Assigned { .. })
    }

    /// Assigned trainer's name, if any
    pub fn trainer(&self) -> Option<&str> {
        match &self.outcome {
            BackfillOutcome::Assigned { trainer, .. } => Some(trainer),
            BackfillOutcome::Failed { .. } => None,
        }
    }

    /// Failure reason, if any
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            BackfillOutcome::Assigned { .. } => None,
            BackfillOutcome::Failed { error } => Some(error),
        }
    }
}

/// Result of a backfill run
///
/// Only members that lacked an active trainer produce entries. Members that
/// already had one are counted in `already_assigned`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Per-member results in scan order
    pub entries: Vec<BackfillEntry>,

    /// Members skipped because they already had an active trainer
    pub already_assigned: usize,
}

impl BackfillReport {
    /// Entries that ended with an assignment
    pub fn assigned_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    /// Entries that ended without an assignment
    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.assigned_count()
    }
}

/// Trainer load as shown on the capacity overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainerCapacity {
    /// Trainer and active count
    #[serde(flatten)]
    pub load: TrainerLoad,

    /// Ceiling the count is measured against
    pub capacity: i64,

    /// Free slots
    pub slots_remaining: i64,

    /// Whether the trainer is full
    pub at_capacity: bool,
}

/// Assigns members to trainers through an [`AssignmentStore`]
#[derive(Debug, Clone)]
pub struct AssignmentService<S> {
    store: S,
}

impl<S: AssignmentStore> AssignmentService<S> {
    /// Creates a service over `store`
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Capacity ceiling per trainer
    pub fn capacity(&self) -> i64 {
        MAX_MEMBERS_PER_TRAINER
    }

    /// Finds the least-loaded trainer with room for another member
    ///
    /// # Errors
    ///
    /// See [`find_least_loaded_trainer`].
    pub async fn find_available_trainer(&self) -> AssignmentResult<TrainerLoad> {
        find_least_loaded_trainer(&self.store).await
    }

    /// Creates an active relationship between a member and a trainer
    ///
    /// Both IDs are expected to reference existing accounts of the right
    /// role; that is not re-checked here, and neither is an existing active
    /// relationship for the member.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Store`] if the insert fails.
    pub async fn assign_member(
        &self,
        member_id: Uuid,
        trainer_id: Uuid,
    ) -> AssignmentResult<MemberTrainerRelationship> {
        let relationship = self
            .store
            .insert_relationship(member_id, trainer_id)
            .await
            .map_err(|err| {
                error!(
                    member_id = %member_id,
                    trainer_id = %trainer_id,
                    error = %err,
                    "Failed to assign member to trainer"
                );
                AssignmentError::from(err)
            })?;

        info!(
            relationship_id = %relationship.id,
            member_id = %member_id,
            trainer_id = %trainer_id,
            "Member assigned to trainer"
        );

        Ok(relationship)
    }

    /// Assigns a trainer to a newly registered account
    ///
    /// Non-member accounts are skipped without touching the store. For
    /// members, the least-loaded trainer is selected and an active
    /// relationship is created. Nothing here can fail registration: every
    /// error is folded into the returned outcome.
    pub async fn auto_assign(&self, account: &Account) -> AutoAssignOutcome {
        if account.role != AccountRole::Member {
            return AutoAssignOutcome::Skipped;
        }

        info!(member_id = %account.id, "Attempting to assign new member to a trainer");

        let selected = match self.find_available_trainer().await {
            Ok(selected) => selected,
            Err(err) => {
                warn!(member_id = %account.id, error = %err, "No trainer available for new member");
                return AutoAssignOutcome::NoTrainer(err);
            }
        };

        match self.assign_member(account.id, selected.trainer.id).await {
            Ok(relationship) => {
                let active_members = selected.active_members + 1;
                info!(
                    member_id = %account.id,
                    trainer = %selected.trainer.full_name,
                    active_members,
                    capacity = MAX_MEMBERS_PER_TRAINER,
                    "New member assigned"
                );
                AutoAssignOutcome::Assigned {
                    trainer: selected.trainer,
                    relationship,
                    active_members,
                }
            }
            Err(error) => AutoAssignOutcome::AssignFailed {
                trainer: selected.trainer,
                error,
            },
        }
    }

    /// Assigns trainers to every member without an active relationship
    ///
    /// Members are scanned first, then processed one at a time in scan
    /// order. Each member gets a fresh trainer selection, so load spreads as
    /// the run progresses. A member whose active-relationship lookup fails
    /// is reported as failed rather than assigned, so a member is never
    /// given a second active trainer on a read error.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Store`] only if the member scan fails.
    pub async fn backfill(&self) -> AssignmentResult<BackfillReport> {
        info!("Starting bulk trainer assignment for existing members");

        let members = self.store.select_accounts(AccountRole::Member).await?;

        let mut report = BackfillReport::default();
        // Lookup failures are resolved during the scan but reported in scan
        // order alongside the members that still need a trainer.
        let mut pending: Vec<Result<Account, BackfillEntry>> = Vec::new();

        for member in members {
            match self.store.find_active_relationship(member.id).await {
                Ok(Some(_)) => report.already_assigned += 1,
                Ok(None) => pending.push(Ok(member)),
                Err(err) => {
                    warn!(member_id = %member.id, error = %err, "Failed to check existing assignment");
                    pending.push(Err(BackfillEntry {
                        member_id: member.id,
                        member: member.full_name,
                        outcome: BackfillOutcome::Failed {
                            error: format!("Failed to check existing assignment: {}", err),
                        },
                    }));
                }
            }
        }

        info!(
            members_without_trainer = pending.len(),
            already_assigned = report.already_assigned,
            "Found members without trainers"
        );

        for item in pending {
            let entry = match item {
                Ok(member) => {
                    let outcome = self.backfill_member(&member).await;
                    BackfillEntry {
                        member_id: member.id,
                        member: member.full_name,
                        outcome,
                    }
                }
                Err(entry) => entry,
            };
            report.entries.push(entry);
        }

        info!(
            assigned = report.assigned_count(),
            failed = report.failed_count(),
            already_assigned = report.already_assigned,
            "Bulk trainer assignment finished"
        );

        Ok(report)
    }

    async fn backfill_member(&self, member: &Account) -> BackfillOutcome {
        let selected = match self.find_available_trainer().await {
            Ok(selected) => selected,
            Err(err) => {
                warn!(member = %member.full_name, error = %err, "No trainers available for member");
                return BackfillOutcome::Failed {
                    error: format!("No trainers available: {}", err),
                };
            }
        };

        match self.assign_member(member.id, selected.trainer.id).await {
            Ok(_) => BackfillOutcome::Assigned {
                trainer_id: selected.trainer.id,
                trainer: selected.trainer.full_name,
            },
            Err(err) => BackfillOutcome::Failed {
                error: err.to_string(),
            },
        }
    }

    /// Current load of every trainer against the ceiling
    ///
    /// Empty when no trainer accounts exist.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Store`] if the trainer scan fails.
    pub async fn capacity_overview(&self) -> AssignmentResult<Vec<TrainerCapacity>> {
        let loads = match trainer_loads(&self.store).await {
            Ok(loads) => loads,
            Err(AssignmentError::NoTrainersAvailable) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let capacity = MAX_MEMBERS_PER_TRAINER;
        Ok(loads
            .into_iter()
            .map(|load| TrainerCapacity {
                capacity,
                slots_remaining: load.slots_remaining(capacity),
                at_capacity: load.is_at_capacity(capacity),
                load,
            })
            .collect())
    }
}
