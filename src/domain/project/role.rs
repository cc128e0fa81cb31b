//! Project membership roles.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ProjectId, Timestamp, UserId};
use crate::domain::wallet::ResourceType;

/// Role a user can hold in a project.
///
/// Facilitator is many-to-many; storyteller is constrained to one active
/// project per user and one active storyteller per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Facilitator,
    Storyteller,
}

impl RoleKind {
    /// Stable string form used in storage and over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Facilitator => "facilitator",
            RoleKind::Storyteller => "storyteller",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "facilitator" => Some(RoleKind::Facilitator),
            "storyteller" => Some(RoleKind::Storyteller),
            _ => None,
        }
    }

    /// The wallet resource consumed when an invitation for this role is
    /// accepted.
    pub fn seat_resource(&self) -> ResourceType {
        match self {
            RoleKind::Facilitator => ResourceType::FacilitatorSeat,
            RoleKind::Storyteller => ResourceType::StorytellerSeat,
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleStatus {
    Active,
    Removed,
}

impl RoleStatus {
    /// Stable string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleStatus::Active => "active",
            RoleStatus::Removed => "removed",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(RoleStatus::Active),
            "removed" => Some(RoleStatus::Removed),
            _ => None,
        }
    }
}

/// Join entity: a user's role in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRole {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub role: RoleKind,
    pub status: RoleStatus,
    pub granted_at: Timestamp,
}

impl ProjectRole {
    /// Creates an active role assignment.
    pub fn new(user_id: UserId, project_id: ProjectId, role: RoleKind, now: Timestamp) -> Self {
        Self {
            user_id,
            project_id,
            role,
            status: RoleStatus::Active,
            granted_at: now,
        }
    }

    /// Whether this assignment currently grants the role.
    pub fn is_active(&self) -> bool {
        self.status == RoleStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_kind_maps_to_seat_resource() {
        assert_eq!(
            RoleKind::Facilitator.seat_resource(),
            ResourceType::FacilitatorSeat
        );
        assert_eq!(
            RoleKind::Storyteller.seat_resource(),
            ResourceType::StorytellerSeat
        );
    }

    #[test]
    fn role_kind_string_roundtrip() {
        assert_eq!(RoleKind::parse("facilitator"), Some(RoleKind::Facilitator));
        assert_eq!(RoleKind::parse("storyteller"), Some(RoleKind::Storyteller));
        assert_eq!(RoleKind::parse("narrator"), None);
    }

    #[test]
    fn new_role_is_active() {
        let role = ProjectRole::new(
            UserId::new(),
            ProjectId::new(),
            RoleKind::Facilitator,
            Timestamp::now(),
        );
        assert!(role.is_active());
    }
}
