/// Member-trainer relationship model and database operations
///
/// A relationship links one member to one trainer. Only relationships with
/// status `active` count toward a trainer's load, and a member may hold at
/// most one active relationship at a time.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE relationship_status AS ENUM ('active', 'inactive', 'completed');
///
/// CREATE TABLE member_trainer_relationships (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     member_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     trainer_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     status relationship_status NOT NULL DEFAULT 'active',
///     assigned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     notes TEXT
/// );
///
/// CREATE UNIQUE INDEX uniq_active_relationship_per_member
///     ON member_trainer_relationships (member_id)
///     WHERE status = 'active';
/// ```
///
/// # Lifecycle
///
/// Rows are created with status `active` by the assignment core. Moving a
/// relationship to `inactive` or `completed` happens elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Lifecycle status of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "relationship_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    /// Counts toward the trainer's capacity
    Active,

    /// Paused or ended without completion
    Inactive,

    /// Program finished
    Completed,
}

impl RelationshipStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Active => "active",
            RelationshipStatus::Inactive => "inactive",
            RelationshipStatus::Completed => "completed",
        }
    }
}

/// Relationship between a member and their trainer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberTrainerRelationship {
    /// Unique relationship ID
    pub id: Uuid,

    /// Member account
    pub member_id: Uuid,

    /// Trainer account
    pub trainer_id: Uuid,

    /// Lifecycle status
    pub status: RelationshipStatus,

    /// When the member was assigned
    pub assigned_at: DateTime<Utc>,

    /// Optional free-text notes from the trainer
    pub notes: Option<String>,
}

/// One row of a trainer's roster: the active relationship plus member details
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RosterEntry {
    /// Relationship ID
    pub relationship_id: Uuid,

    /// When the member was assigned
    pub assigned_at: DateTime<Utc>,

    /// Relationship status (always active for roster listings)
    pub status: RelationshipStatus,

    /// Trainer notes
    pub notes: Option<String>,

    /// Member account ID
    pub member_id: Uuid,

    /// Member display name
    pub full_name: String,

    /// Member email
    pub email: String,

    /// When the member account was created
    pub member_since: DateTime<Utc>,
}

/// The trainer currently assigned to a member
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssignedTrainer {
    /// Relationship ID
    pub relationship_id: Uuid,

    /// When the member was assigned
    pub assigned_at: DateTime<Utc>,

    /// Relationship status
    pub status: RelationshipStatus,

    /// Trainer account ID
    pub trainer_id: Uuid,

    /// Trainer display name
    pub full_name: String,

    /// Trainer email
    pub email: String,
}

impl MemberTrainerRelationship {
    /// Creates a new active relationship stamped with the current time
    ///
    /// No existence check is made here. A member who already has an active
    /// relationship is rejected by `uniq_active_relationship_per_member`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The member already has an active relationship (unique index violation)
    /// - Member or trainer doesn't exist (foreign key violation)
    /// - Database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use fitstudio_shared::models::relationship::MemberTrainerRelationship;
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, member_id: Uuid, trainer_id: Uuid) -> Result<(), sqlx::Error> {
    /// let relationship = MemberTrainerRelationship::create_active(&pool, member_id, trainer_id).await?;
    /// println!("Assigned at {}", relationship.assigned_at);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_active(
        pool: &PgPool,
        member_id: Uuid,
        trainer_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let relationship = sqlx::query_as::<_, MemberTrainerRelationship>(
            r#"
            INSERT INTO member_trainer_relationships (member_id, trainer_id, status, assigned_at)
            VALUES ($1, $2, 'active', NOW())
            RETURNING id, member_id, trainer_id, status, assigned_at, notes
            "#,
        )
        .bind(member_id)
        .bind(trainer_id)
        .fetch_one(pool)
        .await?;

        Ok(relationship)
    }

    /// Finds the member's active relationship, if any
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_active_by_member(
        pool: &PgPool,
        member_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let relationship = sqlx::query_as::<_, MemberTrainerRelationship>(
            r#"
            SELECT id, member_id, trainer_id, status, assigned_at, notes
            FROM member_trainer_relationships
            WHERE member_id = $1 AND status = 'active'
            LIMIT 1
            "#,
        )
        .bind(member_id)
        .fetch_optional(pool)
        .await?;

        Ok(relationship)
    }

    /// Counts the trainer's active relationships
    ///
    /// Always recomputed from the table; there is no cached counter.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn count_active_by_trainer(pool: &PgPool, trainer_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM member_trainer_relationships WHERE trainer_id = $1 AND status = 'active'",
        )
        .bind(trainer_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Lists the trainer's active members with their account details
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use fitstudio_shared::models::relationship::MemberTrainerRelationship;
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, trainer_id: Uuid) -> Result<(), sqlx::Error> {
    /// let roster = MemberTrainerRelationship::list_roster(&pool, trainer_id).await?;
    /// for entry in roster {
    ///     println!("{} since {}", entry.full_name, entry.assigned_at);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_roster(pool: &PgPool, trainer_id: Uuid) -> Result<Vec<RosterEntry>, sqlx::Error> {
        let roster = sqlx::query_as::<_, RosterEntry>(
            r#"
            SELECT r.id AS relationship_id,
                   r.assigned_at,
                   r.status,
                   r.notes,
                   a.id AS member_id,
                   a.full_name,
                   a.email,
                   a.created_at AS member_since
            FROM member_trainer_relationships r
            JOIN accounts a ON a.id = r.member_id
            WHERE r.trainer_id = $1 AND r.status = 'active'
            ORDER BY r.assigned_at ASC
            "#,
        )
        .bind(trainer_id)
        .fetch_all(pool)
        .await?;

        Ok(roster)
    }

    /// Finds the trainer currently assigned to a member
    ///
    /// Returns `None` when the member has no active relationship.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_assigned_trainer(
        pool: &PgPool,
        member_id: Uuid,
    ) -> Result<Option<AssignedTrainer>, sqlx::Error> {
        let trainer = sqlx::query_as::<_, AssignedTrainer>(
            r#"
            SELECT r.id AS relationship_id,
                   r.assigned_at,
                   r.status,
                   a.id AS trainer_id,
                   a.full_name,
                   a.email
            FROM member_trainer_relationships r
            JOIN accounts a ON a.id = r.trainer_id
            WHERE r.member_id = $1 AND r.status = 'active'
            LIMIT 1
            "#,
        )
        .bind(member_id)
        .fetch_optional(pool)
        .await?;

        Ok(trainer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_status_as_str() {
        assert_eq!(RelationshipStatus::Active.as_str(), "active");
        assert_eq!(RelationshipStatus::Inactive.as_str(), "inactive");
        assert_eq!(RelationshipStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_relationship_status_serde() {
        let json = serde_json::to_string(&RelationshipStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
