//! Project store port.
//!
//! Persists projects, role assignments, and subscriptions. Project creation
//! is one unit of work (project row + creator facilitator role + initial
//! subscription commit together); role queries back the storyteller
//! uniqueness rules.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProjectId, UserId};
use crate::domain::project::{Project, ProjectRole, RoleKind, Subscription};

/// Port for project persistence and role queries.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Creates the project row, the creator's facilitator role, and the
    /// initial subscription as one unit of work.
    async fn create_project(
        &self,
        project: &Project,
        creator_role: &ProjectRole,
        subscription: &Subscription,
    ) -> Result<(), DomainError>;

    /// Looks up a project by id.
    async fn find_project(&self, id: &ProjectId) -> Result<Option<Project>, DomainError>;

    /// Persists a role assignment.
    ///
    /// # Errors
    ///
    /// - `ALREADY_MEMBER` if the user already holds the role in the project
    /// - `PROJECT_HAS_STORYTELLER` / `STORYTELLER_ELSEWHERE` when a
    ///   storyteller uniqueness constraint loses a race at commit time
    async fn assign_role(&self, role: &ProjectRole) -> Result<(), DomainError>;

    /// Removes a role assignment (compensation path only).
    async fn remove_role(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        role: RoleKind,
    ) -> Result<(), DomainError>;

    /// Whether the user holds an active role of this kind in the project.
    async fn has_active_role(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        role: RoleKind,
    ) -> Result<bool, DomainError>;

    /// The project's active storyteller, if any.
    async fn find_active_storyteller(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<UserId>, DomainError>;

    /// The project in which the user is active storyteller, if any.
    ///
    /// Backs the platform-wide one-storyteller-project-per-user rule.
    async fn storyteller_project_of(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ProjectId>, DomainError>;

    /// The project's subscription, if initialized.
    async fn find_subscription(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<Subscription>, DomainError>;
}
