//! PostgreSQL implementation of ProjectStore.
//!
//! Project creation commits the project row, the creator's facilitator role,
//! and the initial subscription in one transaction. Storyteller uniqueness
//! is enforced by partial unique indexes; constraint violations map to the
//! domain's rejection codes so races lost at commit time surface the same
//! errors as validator pre-checks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId, Timestamp, UserId};
use crate::domain::project::{
    Project, ProjectRole, RoleKind, RoleStatus, Subscription, SubscriptionStatus,
};
use crate::ports::ProjectStore;

/// PostgreSQL implementation of the ProjectStore port.
pub struct PostgresProjectStore {
    pool: PgPool,
}

impl PostgresProjectStore {
    /// Creates a new PostgresProjectStore with the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a project.
#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: ProjectId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            name: row.name,
            description: row.description,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    project_id: Uuid,
    status: String,
    current_period_start: DateTime<Utc>,
    current_period_end: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status = SubscriptionStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid subscription status: {}", row.status),
            )
        })?;

        Ok(Subscription {
            project_id: ProjectId::from_uuid(row.project_id),
            status,
            current_period_start: Timestamp::from_datetime(row.current_period_start),
            current_period_end: Timestamp::from_datetime(row.current_period_end),
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// Maps role-uniqueness constraint violations to domain rejections.
fn role_conflict_error(e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.constraint() {
            Some("uq_project_roles_active") => {
                return DomainError::new(
                    ErrorCode::AlreadyMember,
                    "User already holds this role in the project",
                );
            }
            Some("uq_project_storyteller") => {
                return DomainError::new(
                    ErrorCode::ProjectHasStoryteller,
                    "Project already has an active storyteller",
                );
            }
            Some("uq_user_storyteller") => {
                return DomainError::new(
                    ErrorCode::StorytellerElsewhere,
                    "User is already the storyteller of another project",
                );
            }
            _ => {}
        }
    }
    db_error("Failed to assign role", e)
}

async fn insert_role(
    executor: &mut sqlx::PgConnection,
    role: &ProjectRole,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO project_roles (user_id, project_id, role, status, granted_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(role.user_id.as_uuid())
    .bind(role.project_id.as_uuid())
    .bind(role.role.as_str())
    .bind(role.status.as_str())
    .bind(role.granted_at.as_datetime())
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl ProjectStore for PostgresProjectStore {
    async fn create_project(
        &self,
        project: &Project,
        creator_role: &ProjectRole,
        subscription: &Subscription,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to open project transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO projects (id, owner_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(project.id.as_uuid())
        .bind(project.owner_id.as_uuid())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.created_at.as_datetime())
        .bind(project.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert project", e))?;

        insert_role(&mut *tx, creator_role)
            .await
            .map_err(role_conflict_error)?;

        sqlx::query(
            r#"
            INSERT INTO subscriptions (project_id, status, current_period_start, current_period_end)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(subscription.project_id.as_uuid())
        .bind(subscription.status.as_str())
        .bind(subscription.current_period_start.as_datetime())
        .bind(subscription.current_period_end.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert subscription", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit project creation", e))?;
        Ok(())
    }

    async fn find_project(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        let row: Option<ProjectRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, description, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find project", e))?;

        Ok(row.map(Project::from))
    }

    async fn assign_role(&self, role: &ProjectRole) -> Result<(), DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        insert_role(&mut *conn, role).await.map_err(role_conflict_error)
    }

    async fn remove_role(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        role: RoleKind,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            DELETE FROM project_roles
            WHERE user_id = $1 AND project_id = $2 AND role = $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(project_id.as_uuid())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to remove role", e))?;
        Ok(())
    }

    async fn has_active_role(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        role: RoleKind,
    ) -> Result<bool, DomainError> {
        let exists: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT 1 FROM project_roles
            WHERE user_id = $1 AND project_id = $2 AND role = $3 AND status = 'active'
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(project_id.as_uuid())
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check role", e))?;

        Ok(exists.is_some())
    }

    async fn find_active_storyteller(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<UserId>, DomainError> {
        let user: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM project_roles
            WHERE project_id = $1 AND role = 'storyteller' AND status = 'active'
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find storyteller", e))?;

        Ok(user.map(UserId::from_uuid))
    }

    async fn storyteller_project_of(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ProjectId>, DomainError> {
        let project: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT project_id FROM project_roles
            WHERE user_id = $1 AND role = 'storyteller' AND status = 'active'
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find storyteller project", e))?;

        Ok(project.map(ProjectId::from_uuid))
    }

    async fn find_subscription(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT project_id, status, current_period_start, current_period_end
            FROM subscriptions
            WHERE project_id = $1
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }
}
