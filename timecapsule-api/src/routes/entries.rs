use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    auth::AuthUser,
    domain::{
        models::EntryType, validate_entry, CandidateEntry, EntryDraft, EntryInterval,
    },
    repositories::{NewTimeEntry, ReceiptRow, TimeEntryRow},
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_entry).get(my_entries))
        .route("/:id", get(entry_by_id))
}

// ============================================================================
// Create Entry
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntryPayload {
    form_params: EntryFormParams,
    int_client: Option<i32>,
    int_billing_number: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFormParams {
    description: String,
    #[serde(with = "time::serde::rfc3339")]
    date_of_entry: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    ended_at: OffsetDateTime,
    #[serde(default)]
    internal_entry: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryResponse {
    message: String,
    last_entry_id: i32,
}

#[instrument(name = "create_entry", skip(app_state, body))]
pub async fn create_entry(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(body): Json<NewEntryPayload>,
) -> Result<Json<CreateEntryResponse>, ApiError> {
    let form = &body.form_params;

    if form.description.trim().is_empty() {
        return Err(ApiError::bad_request("The description field is required"));
    }

    let date_of_entry = form.date_of_entry.to_offset(UtcOffset::UTC);
    if date_of_entry > OffsetDateTime::now_utc() {
        return Err(ApiError::bad_request("You can't insert a future time entry"));
    }

    // The entry date and the two clock times are linked fields: both times
    // land on the entry date no matter what the client sent.
    let draft = EntryDraft::new()
        .with_started_at(form.started_at.to_offset(UtcOffset::UTC))
        .with_ended_at(form.ended_at.to_offset(UtcOffset::UTC))
        .with_entry_date(date_of_entry.date());
    let Some((started_at, ended_at)) = draft.times() else {
        return Err(ApiError::internal("entry draft is missing its times"));
    };

    // Re-check against the latest persisted entries rather than a
    // client-held list. Still optimistic: two in-flight submissions of the
    // same user can both pass.
    let existing = app_state
        .entry_repo
        .entries_for_user(user.id.as_i32())
        .await?;
    let intervals = existing
        .iter()
        .map(|entry| EntryInterval {
            started_at: entry.started_at,
            ended_at: entry.ended_at,
        })
        .collect::<Vec<_>>();

    let candidate = CandidateEntry {
        started_at,
        ended_at,
        internal_entry: form.internal_entry,
    };
    let validated = validate_entry(&candidate, &intervals)?;

    let (client_id, billing_number_id) = match validated.entry_type {
        EntryType::External => {
            let client_id = body.int_client.ok_or_else(|| {
                ApiError::bad_request("A client is required for billable entries")
            })?;
            let billing_number_id = body.int_billing_number.ok_or_else(|| {
                ApiError::bad_request("A billing number is required for billable entries")
            })?;
            (Some(client_id), Some(billing_number_id))
        }
        EntryType::Internal => (None, None),
    };

    let new_entry = NewTimeEntry {
        uuid: Uuid::new_v4(),
        user_id: user.id.as_i32(),
        description: form.description.clone(),
        date_of_entry,
        started_at: validated.started_at,
        ended_at: validated.ended_at,
        entry_type: validated.entry_type,
        status: validated.status,
        client_id,
        billing_number_id,
    };
    let last_entry_id = app_state.entry_repo.create_entry(&new_entry).await?;

    Ok(Json(CreateEntryResponse {
        message: format!("Your {} Entry has been created!", validated.entry_type),
        last_entry_id,
    }))
}

// ============================================================================
// My Entries
// ============================================================================

#[instrument(name = "my_entries", skip(app_state))]
pub async fn my_entries(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<TimeEntryRow>>, ApiError> {
    let entries = app_state
        .entry_repo
        .entries_for_user(user.id.as_i32())
        .await?;

    Ok(Json(entries))
}

// ============================================================================
// Entry by Id
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    #[serde(default)]
    receipts: bool,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    entry: EntryWithReceipts,
}

#[derive(Debug, Serialize)]
pub struct EntryWithReceipts {
    #[serde(flatten)]
    entry: TimeEntryRow,
    receipts: Vec<ReceiptRow>,
}

#[instrument(name = "entry_by_id", skip(app_state))]
pub async fn entry_by_id(
    user: AuthUser,
    Path(id): Path<i32>,
    Query(query): Query<EntryQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = find_owned_entry(&app_state, id, &user).await?;

    let receipts = if query.receipts {
        app_state.receipt_repo.receipts_for_entry(id).await?
    } else {
        Vec::new()
    };

    Ok(Json(EntryResponse {
        entry: EntryWithReceipts { entry, receipts },
    }))
}

/// Look up an entry and make sure it belongs to the caller. Foreign entries
/// are reported as missing, not forbidden.
pub(super) async fn find_owned_entry(
    app_state: &AppState,
    id: i32,
    user: &AuthUser,
) -> Result<TimeEntryRow, ApiError> {
    let entry = app_state.entry_repo.find_entry(id).await?;

    if entry.user_id != user.id.as_i32() {
        return Err(ApiError::not_found("entry not found"));
    }

    Ok(entry)
}
