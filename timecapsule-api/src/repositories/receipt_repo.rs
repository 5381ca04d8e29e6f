use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;

use super::repo_error::RepositoryError;

#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    async fn create_receipt(&self, receipt: &NewReceipt) -> Result<ReceiptRow, RepositoryError>;
    async fn receipts_for_entry(&self, entry_id: i32) -> Result<Vec<ReceiptRow>, RepositoryError>;
}

pub struct ReceiptRepositoryImpl {
    pool: PgPool,
}

impl ReceiptRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRow {
    pub id: i32,
    pub time_entry_id: i32,
    pub url: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub amount: String,
    pub currency: String,
    pub exchange_rate: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_receipt: time::OffsetDateTime,
    pub invoiced: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

pub struct NewReceipt {
    pub time_entry_id: i32,
    pub url: String,
    pub description: String,
    // Kept as text in the schema to preserve the submitted formatting.
    pub amount: String,
    pub currency: String,
    pub exchange_rate: String,
    pub date_of_receipt: time::OffsetDateTime,
}

#[async_trait]
impl ReceiptRepository for ReceiptRepositoryImpl {
    async fn create_receipt(&self, receipt: &NewReceipt) -> Result<ReceiptRow, RepositoryError> {
        let row = sqlx::query_as::<_, ReceiptRow>(
            r#"
            INSERT INTO receipts (time_entry_id, url, description, amount, currency, exchange_rate, date_of_receipt)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, time_entry_id, url, description, amount, currency, exchange_rate, date_of_receipt, invoiced, created_at
            "#,
        )
        .bind(receipt.time_entry_id)
        .bind(&receipt.url)
        .bind(&receipt.description)
        .bind(&receipt.amount)
        .bind(&receipt.currency)
        .bind(&receipt.exchange_rate)
        .bind(receipt.date_of_receipt)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn receipts_for_entry(&self, entry_id: i32) -> Result<Vec<ReceiptRow>, RepositoryError> {
        let receipts = sqlx::query_as::<_, ReceiptRow>(
            r#"
            SELECT id, time_entry_id, url, description, amount, currency, exchange_rate, date_of_receipt, invoiced, created_at
            FROM receipts
            WHERE time_entry_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(receipts)
    }
}
