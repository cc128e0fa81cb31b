//! In-memory project store.
//!
//! Role uniqueness rules are checked inside the store mutex, mirroring the
//! partial unique indexes the PostgreSQL adapter relies on: concurrent
//! storyteller assignments resolve to one winner.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId, UserId};
use crate::domain::project::{Project, ProjectRole, RoleKind, Subscription};
use crate::ports::ProjectStore;

#[derive(Default)]
struct ProjectState {
    projects: HashMap<ProjectId, Project>,
    roles: Vec<ProjectRole>,
    subscriptions: HashMap<ProjectId, Subscription>,
}

/// In-memory [`ProjectStore`].
#[derive(Default)]
pub struct InMemoryProjectStore {
    state: Mutex<ProjectState>,
    fail_creates: Mutex<bool>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `create_project` calls fail, for compensation-path
    /// tests.
    pub fn fail_next_creates(&self, fail: bool) {
        *self.fail_creates.lock().unwrap() = fail;
    }

    /// All role assignments, for assertions.
    pub fn roles(&self) -> Vec<ProjectRole> {
        self.state.lock().unwrap().roles.clone()
    }
}

fn check_role_constraints(state: &ProjectState, role: &ProjectRole) -> Result<(), DomainError> {
    let duplicate = state.roles.iter().any(|r| {
        r.is_active()
            && r.user_id == role.user_id
            && r.project_id == role.project_id
            && r.role == role.role
    });
    if duplicate {
        return Err(DomainError::new(
            ErrorCode::AlreadyMember,
            "User already holds this role in the project",
        ));
    }

    if role.role == RoleKind::Storyteller {
        if state
            .roles
            .iter()
            .any(|r| r.is_active() && r.project_id == role.project_id && r.role == RoleKind::Storyteller)
        {
            return Err(DomainError::new(
                ErrorCode::ProjectHasStoryteller,
                "Project already has an active storyteller",
            ));
        }
        if state
            .roles
            .iter()
            .any(|r| r.is_active() && r.user_id == role.user_id && r.role == RoleKind::Storyteller)
        {
            return Err(DomainError::new(
                ErrorCode::StorytellerElsewhere,
                "User is already the storyteller of another project",
            ));
        }
    }

    Ok(())
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn create_project(
        &self,
        project: &Project,
        creator_role: &ProjectRole,
        subscription: &Subscription,
    ) -> Result<(), DomainError> {
        if *self.fail_creates.lock().unwrap() {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated project creation failure",
            ));
        }

        let mut state = self.state.lock().unwrap();
        if state.projects.contains_key(&project.id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Project already exists",
            ));
        }
        check_role_constraints(&state, creator_role)?;

        state.projects.insert(project.id, project.clone());
        state.roles.push(creator_role.clone());
        state.subscriptions.insert(project.id, subscription.clone());
        Ok(())
    }

    async fn find_project(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        Ok(self.state.lock().unwrap().projects.get(id).cloned())
    }

    async fn assign_role(&self, role: &ProjectRole) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        check_role_constraints(&state, role)?;
        state.roles.push(role.clone());
        Ok(())
    }

    async fn remove_role(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        role: RoleKind,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        state.roles.retain(|r| {
            !(&r.user_id == user_id && &r.project_id == project_id && r.role == role)
        });
        Ok(())
    }

    async fn has_active_role(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        role: RoleKind,
    ) -> Result<bool, DomainError> {
        Ok(self.state.lock().unwrap().roles.iter().any(|r| {
            r.is_active() && &r.user_id == user_id && &r.project_id == project_id && r.role == role
        }))
    }

    async fn find_active_storyteller(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<UserId>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .roles
            .iter()
            .find(|r| r.is_active() && &r.project_id == project_id && r.role == RoleKind::Storyteller)
            .map(|r| r.user_id))
    }

    async fn storyteller_project_of(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ProjectId>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .roles
            .iter()
            .find(|r| r.is_active() && &r.user_id == user_id && r.role == RoleKind::Storyteller)
            .map(|r| r.project_id))
    }

    async fn find_subscription(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .subscriptions
            .get(project_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    fn project(owner: UserId) -> Project {
        Project::create(owner, "Family stories", None, now()).unwrap()
    }

    #[tokio::test]
    async fn create_project_persists_all_three_entities() {
        let store = InMemoryProjectStore::new();
        let owner = UserId::new();
        let p = project(owner);
        let role = ProjectRole::new(owner, p.id, RoleKind::Facilitator, now());
        let sub = Subscription::initial_year(p.id, now());

        store.create_project(&p, &role, &sub).await.unwrap();

        assert!(store.find_project(&p.id).await.unwrap().is_some());
        assert!(store
            .has_active_role(&owner, &p.id, RoleKind::Facilitator)
            .await
            .unwrap());
        assert!(store.find_subscription(&p.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn assign_role_enforces_storyteller_uniqueness_per_project() {
        let store = InMemoryProjectStore::new();
        let project_id = ProjectId::new();

        store
            .assign_role(&ProjectRole::new(
                UserId::new(),
                project_id,
                RoleKind::Storyteller,
                now(),
            ))
            .await
            .unwrap();

        let err = store
            .assign_role(&ProjectRole::new(
                UserId::new(),
                project_id,
                RoleKind::Storyteller,
                now(),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProjectHasStoryteller);
    }

    #[tokio::test]
    async fn assign_role_enforces_global_storyteller_uniqueness() {
        let store = InMemoryProjectStore::new();
        let user = UserId::new();

        store
            .assign_role(&ProjectRole::new(
                user,
                ProjectId::new(),
                RoleKind::Storyteller,
                now(),
            ))
            .await
            .unwrap();

        let err = store
            .assign_role(&ProjectRole::new(
                user,
                ProjectId::new(),
                RoleKind::Storyteller,
                now(),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StorytellerElsewhere);
    }

    #[tokio::test]
    async fn assign_role_rejects_duplicates() {
        let store = InMemoryProjectStore::new();
        let user = UserId::new();
        let project_id = ProjectId::new();
        let role = ProjectRole::new(user, project_id, RoleKind::Facilitator, now());

        store.assign_role(&role).await.unwrap();
        let err = store.assign_role(&role).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyMember);
    }

    #[tokio::test]
    async fn facilitators_can_hold_many_projects() {
        let store = InMemoryProjectStore::new();
        let user = UserId::new();

        for _ in 0..3 {
            store
                .assign_role(&ProjectRole::new(
                    user,
                    ProjectId::new(),
                    RoleKind::Facilitator,
                    now(),
                ))
                .await
                .unwrap();
        }
        assert_eq!(store.roles().len(), 3);
    }

    #[tokio::test]
    async fn remove_role_clears_assignment() {
        let store = InMemoryProjectStore::new();
        let user = UserId::new();
        let project_id = ProjectId::new();
        store
            .assign_role(&ProjectRole::new(user, project_id, RoleKind::Storyteller, now()))
            .await
            .unwrap();

        store
            .remove_role(&user, &project_id, RoleKind::Storyteller)
            .await
            .unwrap();
        assert!(store
            .storyteller_project_of(&user)
            .await
            .unwrap()
            .is_none());
    }
}
