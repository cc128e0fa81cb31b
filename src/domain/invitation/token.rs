//! Unguessable invitation token.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;

/// Length of a token in hex characters.
const TOKEN_LEN: usize = 64;

/// Single-use, unguessable token granting access to one invitation.
///
/// 256 bits of hex from two v4 UUIDs; compared only by exact match, never
/// enumerable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvitationToken(String);

impl InvitationToken {
    /// Generates a fresh random token.
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ))
    }

    /// Validates and wraps a token received from a caller.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if s.len() != TOKEN_LEN || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::invalid_format(
                "token",
                "expected 64 hex characters",
            ));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvitationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
