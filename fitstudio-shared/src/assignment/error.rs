/// Error types for trainer assignment
use std::time::Duration;

/// Failure at the store boundary
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query, insert or constraint failure reported by the database
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The call did not complete within the per-call bound
    #[error("Store call timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The store could not be reached or refused the call
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Assignment error types
///
/// Each variant renders a distinct message because these strings end up in
/// registration responses and backfill reports.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    /// Infrastructure, connectivity or constraint fault; may be retried
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Zero trainer accounts exist
    #[error("No trainer accounts exist")]
    NoTrainersAvailable,

    /// Every trainer is at the capacity ceiling
    #[error("All trainers have reached their maximum capacity ({capacity} members)")]
    CapacityExhausted {
        /// The ceiling that was hit
        capacity: i64,
    },
}

impl AssignmentError {
    /// Whether the failure came from the store rather than from studio state
    pub fn is_store_error(&self) -> bool {
        matches!(self, AssignmentError::Store(_))
    }
}

/// Assignment result type alias
pub type AssignmentResult<T> = Result<T, AssignmentError>;
