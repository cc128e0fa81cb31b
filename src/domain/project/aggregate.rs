//! Project aggregate entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ProjectId, Timestamp, UserId, ValidationError};

/// A family storytelling project.
///
/// Created by consuming one project voucher from the owner's wallet; the
/// owner holds the facilitator role from creation and is the wallet debited
/// when invitations to the project are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: ProjectId,

    /// User whose voucher created the project and whose wallet funds its
    /// seats.
    pub owner_id: UserId,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// When the project was created.
    pub created_at: Timestamp,

    /// When the project was last updated.
    pub updated_at: Timestamp,
}

impl Project {
    /// Creates a project, validating the name.
    pub fn create(
        owner_id: UserId,
        name: impl Into<String>,
        description: Option<String>,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        Ok(Self {
            id: ProjectId::new(),
            owner_id,
            name,
            description,
            created_at: now,
            updated_at: now,
        })
    }
}
