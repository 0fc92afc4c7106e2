/// Account model and database operations
///
/// Members and trainers live in a single `accounts` table and are told apart
/// by their role. Accounts are created by registration; the assignment core
/// only ever reads them.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE account_role AS ENUM ('member', 'trainer');
///
/// CREATE TABLE accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     full_name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role account_role NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use fitstudio_shared::models::account::{Account, AccountRole, CreateAccount};
/// use fitstudio_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let account = Account::create(&pool, CreateAccount {
///     full_name: "Jane Doe".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: AccountRole::Member,
/// }).await?;
///
/// let trainers = Account::list_by_role(&pool, AccountRole::Trainer).await?;
/// println!("{} has {} trainers to choose from", account.full_name, trainers.len());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role marker of a studio account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Trains at the studio and is assigned to a trainer
    Member,

    /// Coaches a roster of members
    Trainer,
}

impl AccountRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Member => "member",
            AccountRole::Trainer => "trainer",
        }
    }
}

/// Account model
///
/// The password hash is never loaded into this struct; it is only written
/// on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID
    pub id: Uuid,

    /// Display name
    pub full_name: String,

    /// Contact email (unique across all accounts)
    pub email: String,

    /// Member or trainer
    pub role: AccountRole,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    /// Display name
    pub full_name: String,

    /// Contact email
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Member or trainer
    pub role: AccountRole,
}

impl Account {
    /// Whether this account is a member
    pub fn is_member(&self) -> bool {
        self.role == AccountRole::Member
    }

    /// Creates a new account
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint `accounts_email_key`)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (full_name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, email, role, created_at
            "#,
        )
        .bind(data.full_name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, full_name, email, role, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Lists all accounts with the given role
    ///
    /// Ordered by creation time (then ID) so trainer selection ties break the
    /// same way on every call.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use fitstudio_shared::models::account::{Account, AccountRole};
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// let members = Account::list_by_role(&pool, AccountRole::Member).await?;
    /// println!("Studio has {} members", members.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_by_role(pool: &PgPool, role: AccountRole) -> Result<Vec<Self>, sqlx::Error> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, full_name, email, role, created_at
            FROM accounts
            WHERE role = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(role)
        .fetch_all(pool)
        .await?;

        Ok(accounts)
    }
}
