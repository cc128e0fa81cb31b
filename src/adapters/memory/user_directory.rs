//! In-memory user directory.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{NewUser, UserAccount, UserDirectory};

/// In-memory [`UserDirectory`].
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<Vec<UserAccount>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an existing account.
    pub fn insert(&self, account: UserAccount) {
        self.users.lock().unwrap().push(account);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserAccount, DomainError> {
        let mut users = self.users.lock().unwrap();

        let exists = users.iter().any(|u| {
            (new_user.email.is_some() && u.email == new_user.email)
                || (new_user.phone.is_some() && u.phone == new_user.phone)
        });
        if exists {
            return Err(DomainError::new(
                ErrorCode::UserExists,
                "An account with this email or phone already exists; sign in instead",
            ));
        }

        let account = UserAccount {
            id: UserId::new(),
            name: new_user.name,
            email: new_user.email,
            phone: new_user.phone,
        };
        users.push(account.clone());
        Ok(account)
    }
}
