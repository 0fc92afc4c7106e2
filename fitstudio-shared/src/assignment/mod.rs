/// Trainer assignment
///
/// Links members to trainers under a fixed per-trainer capacity.
///
/// # Modules
///
/// - [`store`]: the `AssignmentStore` seam the algorithms run against
/// - [`postgres`]: PostgreSQL store with a bounded per-call timeout
/// - [`memory`]: in-memory store with fault injection
/// - [`selector`]: least-loaded trainer selection
/// - [`service`]: assignment, auto-assignment on registration, and backfill
/// - [`error`]: `StoreError` and `AssignmentError`
///
/// # Invariants
///
/// - A member has at most one active relationship. The store guards this
///   with a partial unique index; the core checks before inserting during
///   backfill.
/// - A trainer is only selected while their active count is below
///   [`MAX_MEMBERS_PER_TRAINER`]. This is checked at assignment time only.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod selector;
pub mod service;
pub mod store;

pub use error::{AssignmentError, AssignmentResult, StoreError, StoreResult};
pub use memory::InMemoryAssignmentStore;
pub use postgres::PgAssignmentStore;
pub use selector::TrainerLoad;
pub use service::{
    AssignmentService, AutoAssignOutcome, BackfillEntry, BackfillOutcome, BackfillReport,
    TrainerCapacity,
};
pub use store::AssignmentStore;

/// Maximum active members per trainer
pub const MAX_MEMBERS_PER_TRAINER: i64 = 15;
