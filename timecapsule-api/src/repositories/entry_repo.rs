use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::{EntryStatus, EntryType};

use super::repo_error::RepositoryError;

#[async_trait]
pub trait EntryRepository: Send + Sync {
    async fn create_entry(&self, entry: &NewTimeEntry) -> Result<i32, RepositoryError>;
    async fn entries_for_user(&self, user_id: i32) -> Result<Vec<TimeEntryRow>, RepositoryError>;
    async fn find_entry(&self, id: i32) -> Result<TimeEntryRow, RepositoryError>;
}

pub struct EntryRepositoryImpl {
    pool: PgPool,
}

impl EntryRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryRow {
    pub id: i32,
    pub uuid: Uuid,
    pub user_id: i32,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_entry: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ended_at: time::OffsetDateTime,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub client_id: Option<i32>,
    pub billing_number_id: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

pub struct NewTimeEntry {
    pub uuid: Uuid,
    pub user_id: i32,
    pub description: String,
    pub date_of_entry: time::OffsetDateTime,
    pub started_at: time::OffsetDateTime,
    pub ended_at: time::OffsetDateTime,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub client_id: Option<i32>,
    pub billing_number_id: Option<i32>,
}

const ENTRY_COLUMNS: &str = "id, uuid, user_id, description, date_of_entry, started_at, ended_at, entry_type, status, client_id, billing_number_id, created_at";

#[async_trait]
impl EntryRepository for EntryRepositoryImpl {
    async fn create_entry(&self, entry: &NewTimeEntry) -> Result<i32, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO time_entries (uuid, user_id, description, date_of_entry, started_at, ended_at, entry_type, status, client_id, billing_number_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(entry.uuid)
        .bind(entry.user_id)
        .bind(&entry.description)
        .bind(entry.date_of_entry)
        .bind(entry.started_at)
        .bind(entry.ended_at)
        .bind(entry.entry_type)
        .bind(entry.status)
        .bind(entry.client_id)
        .bind(entry.billing_number_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn entries_for_user(&self, user_id: i32) -> Result<Vec<TimeEntryRow>, RepositoryError> {
        let entries = sqlx::query_as::<_, TimeEntryRow>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM time_entries
            WHERE user_id = $1
            ORDER BY started_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn find_entry(&self, id: i32) -> Result<TimeEntryRow, RepositoryError> {
        let entry = sqlx::query_as::<_, TimeEntryRow>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM time_entries
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        entry.ok_or_else(|| RepositoryError::NotFound(format!("time entry {}", id)))
    }
}
