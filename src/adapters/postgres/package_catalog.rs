//! PostgreSQL implementation of PackageCatalog.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::Package;
use crate::domain::foundation::{DomainError, ErrorCode, PackageId};
use crate::domain::wallet::ResourceBundle;
use crate::ports::PackageCatalog;

/// PostgreSQL implementation of the PackageCatalog port.
pub struct PostgresPackageCatalog {
    pool: PgPool,
}

impl PostgresPackageCatalog {
    /// Creates a new PostgresPackageCatalog with the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a package.
#[derive(Debug, sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    name: String,
    price_cents: i64,
    currency: String,
    project_vouchers: i64,
    facilitator_seats: i64,
    storyteller_seats: i64,
    is_active: bool,
}

impl From<PackageRow> for Package {
    fn from(row: PackageRow) -> Self {
        Package {
            id: PackageId::from_uuid(row.id),
            name: row.name,
            price_cents: row.price_cents,
            currency: row.currency,
            resources: ResourceBundle {
                project_vouchers: row.project_vouchers,
                facilitator_seats: row.facilitator_seats,
                storyteller_seats: row.storyteller_seats,
            },
            is_active: row.is_active,
        }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl PackageCatalog for PostgresPackageCatalog {
    async fn find_by_id(&self, id: &PackageId) -> Result<Option<Package>, DomainError> {
        let row: Option<PackageRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_cents, currency, project_vouchers,
                   facilitator_seats, storyteller_seats, is_active
            FROM packages
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find package", e))?;

        Ok(row.map(Package::from))
    }

    async fn list_active(&self) -> Result<Vec<Package>, DomainError> {
        let rows: Vec<PackageRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_cents, currency, project_vouchers,
                   facilitator_seats, storyteller_seats, is_active
            FROM packages
            WHERE is_active = TRUE
            ORDER BY price_cents ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list packages", e))?;

        Ok(rows.into_iter().map(Package::from).collect())
    }
}
