//! User directory port.
//!
//! Invitation acceptance needs to resolve or create the accepting account.
//! Authentication and session mechanics live elsewhere; this port is only
//! the lookup/create surface the lifecycle consumes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, UserId};

/// A user account as seen by this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Details for creating an account during invitation acceptance.
///
/// Requires a name plus at least one of email/phone; the directory enforces
/// uniqueness on both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Port for account resolution and creation.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks up an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError>;

    /// Looks up an account by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError>;

    /// Looks up an account by phone number.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserAccount>, DomainError>;

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// - `USER_EXISTS` if the email or phone already belongs to an account
    async fn create_user(&self, new_user: NewUser) -> Result<UserAccount, DomainError>;
}
