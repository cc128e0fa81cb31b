//! Role assignment validation.
//!
//! Enforces the storyteller uniqueness rules: at most one active storyteller
//! per project, and a user may be storyteller in at most one project across
//! the whole platform. Invoked at invitation creation and again at
//! acceptance; the gap between the two can be arbitrarily long, so the
//! re-check is mandatory.
//!
//! The final word is the store's own uniqueness constraints; this validator
//! turns the common cases into early, well-formed rejections.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId, UserId};
use crate::ports::ProjectStore;

use super::RoleKind;

/// Validates that a role assignment is legal before a seat is consumed.
pub struct RoleAssignmentValidator {
    projects: Arc<dyn ProjectStore>,
}

impl RoleAssignmentValidator {
    pub fn new(projects: Arc<dyn ProjectStore>) -> Self {
        Self { projects }
    }

    /// Checks the role-specific constraints.
    ///
    /// `user_id` is `None` at invitation-creation time when the target
    /// account is not yet resolvable; user-scoped rules are then re-checked
    /// at acceptance once the account exists.
    pub async fn validate(
        &self,
        user_id: Option<&UserId>,
        project_id: &ProjectId,
        role: RoleKind,
    ) -> Result<(), DomainError> {
        if let Some(user_id) = user_id {
            if self
                .projects
                .has_active_role(user_id, project_id, role)
                .await?
            {
                return Err(DomainError::new(
                    ErrorCode::AlreadyMember,
                    format!("User already holds the {} role in this project", role),
                ));
            }
        }

        if role == RoleKind::Storyteller {
            if self
                .projects
                .find_active_storyteller(project_id)
                .await?
                .is_some()
            {
                return Err(DomainError::new(
                    ErrorCode::ProjectHasStoryteller,
                    "Project already has an active storyteller",
                ));
            }

            if let Some(user_id) = user_id {
                if let Some(project) = self.projects.storyteller_project_of(user_id).await? {
                    return Err(DomainError::new(
                        ErrorCode::StorytellerElsewhere,
                        "User is already the storyteller of another project",
                    )
                    .with_detail("project_id", project.to_string()));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::project::{Project, ProjectRole, Subscription};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockProjectStore {
        roles: Mutex<Vec<ProjectRole>>,
    }

    impl MockProjectStore {
        fn new() -> Self {
            Self {
                roles: Mutex::new(Vec::new()),
            }
        }

        fn with_roles(roles: Vec<ProjectRole>) -> Self {
            Self {
                roles: Mutex::new(roles),
            }
        }
    }

    #[async_trait]
    impl ProjectStore for MockProjectStore {
        async fn create_project(
            &self,
            _project: &Project,
            _creator_role: &ProjectRole,
            _subscription: &Subscription,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_project(&self, _id: &ProjectId) -> Result<Option<Project>, DomainError> {
            Ok(None)
        }

        async fn assign_role(&self, role: &ProjectRole) -> Result<(), DomainError> {
            self.roles.lock().unwrap().push(role.clone());
            Ok(())
        }

        async fn remove_role(
            &self,
            _user_id: &UserId,
            _project_id: &ProjectId,
            _role: RoleKind,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn has_active_role(
            &self,
            user_id: &UserId,
            project_id: &ProjectId,
            role: RoleKind,
        ) -> Result<bool, DomainError> {
            Ok(self.roles.lock().unwrap().iter().any(|r| {
                r.is_active()
                    && &r.user_id == user_id
                    && &r.project_id == project_id
                    && r.role == role
            }))
        }

        async fn find_active_storyteller(
            &self,
            project_id: &ProjectId,
        ) -> Result<Option<UserId>, DomainError> {
            Ok(self
                .roles
                .lock()
                .unwrap()
                .iter()
                .find(|r| {
                    r.is_active() && &r.project_id == project_id && r.role == RoleKind::Storyteller
                })
                .map(|r| r.user_id))
        }

        async fn storyteller_project_of(
            &self,
            user_id: &UserId,
        ) -> Result<Option<ProjectId>, DomainError> {
            Ok(self
                .roles
                .lock()
                .unwrap()
                .iter()
                .find(|r| {
                    r.is_active() && &r.user_id == user_id && r.role == RoleKind::Storyteller
                })
                .map(|r| r.project_id))
        }

        async fn find_subscription(
            &self,
            _project_id: &ProjectId,
        ) -> Result<Option<Subscription>, DomainError> {
            Ok(None)
        }
    }

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    #[tokio::test]
    async fn facilitator_assignment_passes_on_empty_project() {
        let validator = RoleAssignmentValidator::new(Arc::new(MockProjectStore::new()));
        let result = validator
            .validate(Some(&UserId::new()), &ProjectId::new(), RoleKind::Facilitator)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn rejects_duplicate_role_in_same_project() {
        let user = UserId::new();
        let project = ProjectId::new();
        let store = MockProjectStore::with_roles(vec![ProjectRole::new(
            user,
            project,
            RoleKind::Facilitator,
            now(),
        )]);
        let validator = RoleAssignmentValidator::new(Arc::new(store));

        let err = validator
            .validate(Some(&user), &project, RoleKind::Facilitator)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyMember);
    }

    #[tokio::test]
    async fn rejects_second_storyteller_for_project() {
        let project = ProjectId::new();
        let store = MockProjectStore::with_roles(vec![ProjectRole::new(
            UserId::new(),
            project,
            RoleKind::Storyteller,
            now(),
        )]);
        let validator = RoleAssignmentValidator::new(Arc::new(store));

        let err = validator
            .validate(Some(&UserId::new()), &project, RoleKind::Storyteller)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProjectHasStoryteller);
    }

    #[tokio::test]
    async fn rejects_storyteller_active_elsewhere() {
        let user = UserId::new();
        let other_project = ProjectId::new();
        let store = MockProjectStore::with_roles(vec![ProjectRole::new(
            user,
            other_project,
            RoleKind::Storyteller,
            now(),
        )]);
        let validator = RoleAssignmentValidator::new(Arc::new(store));

        let err = validator
            .validate(Some(&user), &ProjectId::new(), RoleKind::Storyteller)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StorytellerElsewhere);
        assert_eq!(
            err.details.get("project_id"),
            Some(&other_project.to_string())
        );
    }

    #[tokio::test]
    async fn storyteller_project_check_runs_without_resolved_user() {
        let project = ProjectId::new();
        let store = MockProjectStore::with_roles(vec![ProjectRole::new(
            UserId::new(),
            project,
            RoleKind::Storyteller,
            now(),
        )]);
        let validator = RoleAssignmentValidator::new(Arc::new(store));

        // Creation-time check with an unresolvable target still sees the
        // project-level constraint.
        let err = validator
            .validate(None, &project, RoleKind::Storyteller)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProjectHasStoryteller);
    }
}
