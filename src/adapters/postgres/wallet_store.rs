//! PostgreSQL implementation of WalletStore and LedgerReader.
//!
//! The wallet row is the unit of mutual exclusion: `apply` takes a row lock
//! (`SELECT ... FOR UPDATE`), re-checks balances, and commits the balance
//! update together with the ledger inserts in one transaction. The ledger is
//! append-only and needs no locking beyond insert atomicity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, ProjectId, Timestamp, TransactionId, UserId,
};
use crate::domain::wallet::{
    LedgerEntry, ResourceType, TransactionType, Wallet, WalletMutation,
};
use crate::ports::{LedgerReader, WalletStore};

/// PostgreSQL implementation of the wallet ports.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresWalletStore {
    pool: PgPool,
}

impl PostgresWalletStore {
    /// Creates a new PostgresWalletStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a wallet.
#[derive(Debug, sqlx::FromRow)]
struct WalletRow {
    user_id: Uuid,
    project_vouchers: i64,
    facilitator_seats: i64,
    storyteller_seats: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WalletRow> for Wallet {
    fn from(row: WalletRow) -> Self {
        Wallet {
            user_id: UserId::from_uuid(row.user_id),
            project_vouchers: row.project_vouchers,
            facilitator_seats: row.facilitator_seats,
            storyteller_seats: row.storyteller_seats,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

/// Database row representation of a ledger entry.
#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    id: Uuid,
    user_id: Uuid,
    transaction_type: String,
    resource_type: String,
    amount: i64,
    description: String,
    project_id: Option<Uuid>,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = DomainError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let transaction_type = TransactionType::parse(&row.transaction_type).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid transaction_type value: {}", row.transaction_type),
            )
        })?;
        let resource_type = ResourceType::parse(&row.resource_type).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid resource_type value: {}", row.resource_type),
            )
        })?;

        Ok(LedgerEntry {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            transaction_type,
            resource_type,
            amount: row.amount,
            description: row.description,
            project_id: row.project_id.map(ProjectId::from_uuid),
            payment_id: row.payment_id,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// Serialization failures are safe to replay; surface them as the retryable
/// conflict code.
fn commit_error(e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("40001") {
            return DomainError::new(
                ErrorCode::ConcurrencyConflict,
                "Wallet mutation lost a serialization race",
            );
        }
    }
    db_error("Failed to commit wallet mutation", e)
}

#[async_trait]
impl WalletStore for PostgresWalletStore {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Wallet, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO wallets (user_id, project_vouchers, facilitator_seats, storyteller_seats, created_at, updated_at)
            VALUES ($1, 0, 0, 0, $2, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create wallet", e))?;

        let row: WalletRow = sqlx::query_as(
            r#"
            SELECT user_id, project_vouchers, facilitator_seats, storyteller_seats, created_at, updated_at
            FROM wallets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load wallet", e))?;

        Ok(row.into())
    }

    async fn find(&self, user_id: &UserId) -> Result<Option<Wallet>, DomainError> {
        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            SELECT user_id, project_vouchers, facilitator_seats, storyteller_seats, created_at, updated_at
            FROM wallets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find wallet", e))?;

        Ok(row.map(Wallet::from))
    }

    async fn apply(
        &self,
        mutation: WalletMutation,
        now: Timestamp,
    ) -> Result<Wallet, DomainError> {
        let user_id = mutation.user_id();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to open wallet transaction", e))?;

        // Row lock: concurrent mutations of the same wallet serialize here.
        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            SELECT user_id, project_vouchers, facilitator_seats, storyteller_seats, created_at, updated_at
            FROM wallets
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock wallet", e))?;

        let mut wallet: Wallet = row
            .map(Wallet::from)
            .ok_or_else(|| DomainError::new(ErrorCode::WalletNotFound, "Wallet not found"))?;

        // Re-check under the lock; an overdraft drops the transaction with
        // nothing applied.
        wallet.apply_deltas(mutation.deltas(), now)?;

        sqlx::query(
            r#"
            UPDATE wallets SET
                project_vouchers = $2,
                facilitator_seats = $3,
                storyteller_seats = $4,
                updated_at = $5
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(wallet.project_vouchers)
        .bind(wallet.facilitator_seats)
        .bind(wallet.storyteller_seats)
        .bind(now.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update wallet balances", e))?;

        for entry in mutation.entries() {
            sqlx::query(
                r#"
                INSERT INTO seat_transactions (
                    id, user_id, transaction_type, resource_type, amount,
                    description, project_id, payment_id, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(entry.id.as_uuid())
            .bind(entry.user_id.as_uuid())
            .bind(entry.transaction_type.as_str())
            .bind(entry.resource_type.as_str())
            .bind(entry.amount)
            .bind(&entry.description)
            .bind(entry.project_id.as_ref().map(|p| *p.as_uuid()))
            .bind(&entry.payment_id)
            .bind(entry.created_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.constraint() == Some("uq_seat_transactions_purchase_payment") {
                        return DomainError::new(
                            ErrorCode::DuplicatePaymentCredit,
                            "Payment has already credited this resource",
                        );
                    }
                }
                DomainError::new(
                    ErrorCode::LedgerWriteFailed,
                    format!("Failed to append ledger entry: {}", e),
                )
            })?;
        }

        tx.commit().await.map_err(commit_error)?;
        Ok(wallet)
    }
}

#[async_trait]
impl LedgerReader for PostgresWalletStore {
    async fn entries_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<LedgerEntry>, DomainError> {
        let rows: Vec<LedgerRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, transaction_type, resource_type, amount,
                   description, project_id, payment_id, created_at
            FROM seat_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load ledger entries", e))?;

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }

    async fn find_by_payment(&self, payment_id: &str) -> Result<Vec<LedgerEntry>, DomainError> {
        let rows: Vec<LedgerRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, transaction_type, resource_type, amount,
                   description, project_id, payment_id, created_at
            FROM seat_transactions
            WHERE payment_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(payment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load ledger entries by payment", e))?;

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }

    async fn sum_for(
        &self,
        user_id: &UserId,
        resource: ResourceType,
    ) -> Result<i64, DomainError> {
        let sum: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount)::BIGINT
            FROM seat_transactions
            WHERE user_id = $1 AND resource_type = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(resource.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to sum ledger entries", e))?;

        Ok(sum.unwrap_or(0))
    }
}
