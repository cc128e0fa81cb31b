//! PostgreSQL implementation of UserDirectory.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{NewUser, UserAccount, UserDirectory};

/// PostgreSQL implementation of the UserDirectory port.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a new PostgresUserDirectory with the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user account.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        UserAccount {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
        }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, email, phone FROM users WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find user", e))?;

        Ok(row.map(UserAccount::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, email, phone FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find user by email", e))?;

        Ok(row.map(UserAccount::from))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserAccount>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, email, phone FROM users WHERE phone = $1")
                .bind(phone)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find user by phone", e))?;

        Ok(row.map(UserAccount::from))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserAccount, DomainError> {
        let account = UserAccount {
            id: UserId::new(),
            name: new_user.name,
            email: new_user.email,
            phone: new_user.phone,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, phone)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.phone)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if matches!(
                    db_err.constraint(),
                    Some("users_email_key") | Some("users_phone_key")
                ) {
                    return DomainError::new(
                        ErrorCode::UserExists,
                        "An account with this email or phone already exists; sign in instead",
                    );
                }
            }
            db_error("Failed to create user", e)
        })?;

        Ok(account)
    }
}
