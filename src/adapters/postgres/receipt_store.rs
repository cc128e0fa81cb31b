//! PostgreSQL implementation of ReceiptStore.
//!
//! Receipts are keyed by a unique payment reference; racing confirmations
//! resolve through `ON CONFLICT DO NOTHING` with the first insert winning.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::PurchaseReceipt;
use crate::domain::foundation::{
    DomainError, ErrorCode, PackageId, ReceiptId, Timestamp, UserId,
};
use crate::domain::wallet::ResourceBundle;
use crate::ports::{ReceiptSaveResult, ReceiptStore};

/// PostgreSQL implementation of the ReceiptStore port.
pub struct PostgresReceiptStore {
    pool: PgPool,
}

impl PostgresReceiptStore {
    /// Creates a new PostgresReceiptStore with the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a receipt.
#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    receipt_id: Uuid,
    user_id: Uuid,
    payment_intent_id: String,
    package_id: Uuid,
    amount_cents: i64,
    currency: String,
    project_vouchers: i64,
    facilitator_seats: i64,
    storyteller_seats: i64,
    purchase_date: DateTime<Utc>,
}

impl From<ReceiptRow> for PurchaseReceipt {
    fn from(row: ReceiptRow) -> Self {
        PurchaseReceipt {
            receipt_id: ReceiptId::from_uuid(row.receipt_id),
            user_id: UserId::from_uuid(row.user_id),
            payment_intent_id: row.payment_intent_id,
            package_id: PackageId::from_uuid(row.package_id),
            amount_cents: row.amount_cents,
            currency: row.currency,
            resources: ResourceBundle {
                project_vouchers: row.project_vouchers,
                facilitator_seats: row.facilitator_seats,
                storyteller_seats: row.storyteller_seats,
            },
            purchase_date: Timestamp::from_datetime(row.purchase_date),
        }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl ReceiptStore for PostgresReceiptStore {
    async fn save(&self, receipt: &PurchaseReceipt) -> Result<ReceiptSaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO purchase_receipts (
                receipt_id, user_id, payment_intent_id, package_id,
                amount_cents, currency, project_vouchers, facilitator_seats,
                storyteller_seats, purchase_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (payment_intent_id) DO NOTHING
            "#,
        )
        .bind(receipt.receipt_id.as_uuid())
        .bind(receipt.user_id.as_uuid())
        .bind(&receipt.payment_intent_id)
        .bind(receipt.package_id.as_uuid())
        .bind(receipt.amount_cents)
        .bind(&receipt.currency)
        .bind(receipt.resources.project_vouchers)
        .bind(receipt.resources.facilitator_seats)
        .bind(receipt.resources.storyteller_seats)
        .bind(receipt.purchase_date.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save receipt", e))?;

        Ok(if result.rows_affected() == 1 {
            ReceiptSaveResult::Inserted
        } else {
            ReceiptSaveResult::AlreadyExists
        })
    }

    async fn find_by_payment(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PurchaseReceipt>, DomainError> {
        let row: Option<ReceiptRow> = sqlx::query_as(
            r#"
            SELECT receipt_id, user_id, payment_intent_id, package_id,
                   amount_cents, currency, project_vouchers, facilitator_seats,
                   storyteller_seats, purchase_date
            FROM purchase_receipts
            WHERE payment_intent_id = $1
            "#,
        )
        .bind(payment_intent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find receipt", e))?;

        Ok(row.map(PurchaseReceipt::from))
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<PurchaseReceipt>, DomainError> {
        let rows: Vec<ReceiptRow> = sqlx::query_as(
            r#"
            SELECT receipt_id, user_id, payment_intent_id, package_id,
                   amount_cents, currency, project_vouchers, facilitator_seats,
                   storyteller_seats, purchase_date
            FROM purchase_receipts
            WHERE user_id = $1
            ORDER BY purchase_date DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list receipts", e))?;

        Ok(rows.into_iter().map(PurchaseReceipt::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_row_converts_to_domain() {
        let row = ReceiptRow {
            receipt_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            payment_intent_id: "pi_1".to_string(),
            package_id: Uuid::new_v4(),
            amount_cents: 9900,
            currency: "usd".to_string(),
            project_vouchers: 1,
            facilitator_seats: 2,
            storyteller_seats: 2,
            purchase_date: Utc::now(),
        };

        let receipt: PurchaseReceipt = row.into();
        assert_eq!(receipt.payment_intent_id, "pi_1");
        assert_eq!(receipt.resources.facilitator_seats, 2);
    }
}
