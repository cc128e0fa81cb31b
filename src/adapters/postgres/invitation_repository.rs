//! PostgreSQL implementation of InvitationRepository.
//!
//! `transition` is a conditional UPDATE on the stored status, so racing
//! accept/cancel/expire requests resolve to exactly one winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, InvitationId, ProjectId, Timestamp, UserId,
};
use crate::domain::invitation::{ContactInfo, Invitation, InvitationStatus, InvitationToken};
use crate::domain::project::RoleKind;
use crate::ports::InvitationRepository;

/// PostgreSQL implementation of the InvitationRepository port.
pub struct PostgresInvitationRepository {
    pool: PgPool,
}

impl PostgresInvitationRepository {
    /// Creates a new PostgresInvitationRepository with the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an invitation.
#[derive(Debug, sqlx::FromRow)]
struct InvitationRow {
    id: Uuid,
    project_id: Uuid,
    role: String,
    token: String,
    status: String,
    created_by: Uuid,
    contact_name: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = DomainError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        let role = RoleKind::parse(&row.role).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid role value: {}", row.role),
            )
        })?;
        let status = InvitationStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid status value: {}", row.status),
            )
        })?;
        let token = InvitationToken::parse(&row.token).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid token: {}", e))
        })?;

        Ok(Invitation {
            id: InvitationId::from_uuid(row.id),
            project_id: ProjectId::from_uuid(row.project_id),
            role,
            token,
            status,
            created_by: UserId::from_uuid(row.created_by),
            contact: ContactInfo {
                name: row.contact_name,
                email: row.contact_email,
                phone: row.contact_phone,
            },
            created_at: Timestamp::from_datetime(row.created_at),
            expires_at: Timestamp::from_datetime(row.expires_at),
            used_at: row.used_at.map(Timestamp::from_datetime),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, project_id, role, token, status, created_by,
           contact_name, contact_email, contact_phone,
           created_at, expires_at, used_at, cancelled_at
    FROM invitations
"#;

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn save(&self, invitation: &Invitation) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO invitations (
                id, project_id, role, token, status, created_by,
                contact_name, contact_email, contact_phone,
                created_at, expires_at, used_at, cancelled_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(invitation.id.as_uuid())
        .bind(invitation.project_id.as_uuid())
        .bind(invitation.role.as_str())
        .bind(invitation.token.as_str())
        .bind(invitation.status.as_str())
        .bind(invitation.created_by.as_uuid())
        .bind(&invitation.contact.name)
        .bind(&invitation.contact.email)
        .bind(&invitation.contact.phone)
        .bind(invitation.created_at.as_datetime())
        .bind(invitation.expires_at.as_datetime())
        .bind(invitation.used_at.as_ref().map(|t| *t.as_datetime()))
        .bind(invitation.cancelled_at.as_ref().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("invitations_token_key") {
                    return DomainError::new(
                        ErrorCode::DatabaseError,
                        "Invitation token already exists",
                    );
                }
            }
            db_error("Failed to save invitation", e)
        })?;

        Ok(())
    }

    async fn transition(
        &self,
        invitation: &Invitation,
        expected: InvitationStatus,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE invitations SET
                token = $2,
                status = $3,
                expires_at = $4,
                used_at = $5,
                cancelled_at = $6
            WHERE id = $1 AND status = $7
            "#,
        )
        .bind(invitation.id.as_uuid())
        .bind(invitation.token.as_str())
        .bind(invitation.status.as_str())
        .bind(invitation.expires_at.as_datetime())
        .bind(invitation.used_at.as_ref().map(|t| *t.as_datetime()))
        .bind(invitation.cancelled_at.as_ref().map(|t| *t.as_datetime()))
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to transition invitation", e))?;

        if result.rows_affected() == 0 {
            let exists: Option<i32> =
                sqlx::query_scalar("SELECT 1 FROM invitations WHERE id = $1")
                    .bind(invitation.id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| db_error("Failed to check invitation existence", e))?;

            return Err(match exists {
                Some(_) => DomainError::new(
                    ErrorCode::ConcurrencyConflict,
                    "Invitation status moved behind this transition",
                ),
                None => {
                    DomainError::new(ErrorCode::InvitationNotFound, "Invitation not found")
                }
            });
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &InvitationId) -> Result<Option<Invitation>, DomainError> {
        let row: Option<InvitationRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find invitation", e))?;

        row.map(Invitation::try_from).transpose()
    }

    async fn find_by_token(
        &self,
        token: &InvitationToken,
    ) -> Result<Option<Invitation>, DomainError> {
        let row: Option<InvitationRow> =
            sqlx::query_as(&format!("{} WHERE token = $1", SELECT_COLUMNS))
                .bind(token.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find invitation by token", e))?;

        row.map(Invitation::try_from).transpose()
    }

    async fn list_pending_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Invitation>, DomainError> {
        let rows: Vec<InvitationRow> = sqlx::query_as(&format!(
            "{} WHERE project_id = $1 AND status = 'pending' ORDER BY created_at ASC",
            SELECT_COLUMNS
        ))
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list pending invitations", e))?;

        rows.into_iter().map(Invitation::try_from).collect()
    }

    async fn list_overdue(&self, now: Timestamp) -> Result<Vec<Invitation>, DomainError> {
        let rows: Vec<InvitationRow> = sqlx::query_as(&format!(
            "{} WHERE status = 'pending' AND expires_at <= $1 ORDER BY expires_at ASC",
            SELECT_COLUMNS
        ))
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list overdue invitations", e))?;

        rows.into_iter().map(Invitation::try_from).collect()
    }
}
