/// Database models for FitStudio
///
/// This module contains the database models and their queries.
///
/// # Models
///
/// - `account`: Member and trainer accounts
/// - `relationship`: Member-to-trainer relationships and roster views
///
/// # Example
///
/// ```no_run
/// use fitstudio_shared::models::relationship::MemberTrainerRelationship;
/// use fitstudio_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(member_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// match MemberTrainerRelationship::find_assigned_trainer(&pool, member_id).await? {
///     Some(trainer) => println!("Trained by {}", trainer.full_name),
///     None => println!("No trainer yet"),
/// }
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod relationship;
