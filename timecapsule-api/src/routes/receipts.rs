use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::UtcOffset;
use tracing::instrument;

use crate::{
    app_state::AppState,
    auth::AuthUser,
    repositories::{NewReceipt, ReceiptRow},
    routes::{entries::find_owned_entry, ApiError},
};

/// UI policy for receipt images.
const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
// Allow multipart overhead while keeping the actual image policy at 2 MiB.
const RECEIPT_UPLOAD_BODY_LIMIT: usize = 3 * 1024 * 1024;

const MAX_AMOUNT: f64 = 5_000_000.0;
const MAX_COMMISSION: f64 = 100.0;
const MAX_EXCHANGE_RATE: f64 = 5_000_000.0;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:entry_id", post(create_receipt).get(entry_receipts))
        .route(
            "/:entry_id/image",
            post(upload_receipt_image).delete(clear_receipt_image),
        )
        .route_layer(DefaultBodyLimit::max(RECEIPT_UPLOAD_BODY_LIMIT))
}

// ============================================================================
// Upload Receipt Image
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    message: String,
    image: String,
    url: String,
}

#[instrument(name = "upload_receipt_image", skip(app_state, multipart))]
pub async fn upload_receipt_image(
    user: AuthUser,
    Path(entry_id): Path<i32>,
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let entry = find_owned_entry(&app_state, entry_id, &user).await?;

    let (file_name, content_type, bytes) = extract_image_from_multipart(&mut multipart).await?;

    if !content_type.starts_with("image/") {
        return Err(ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "only image uploads are accepted",
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "receipt image exceeds the 2 MB limit",
        ));
    }

    // Single-flight per entry: a second upload is rejected while this one
    // holds the Uploading state.
    app_state
        .transition_attachment_flow(entry_id, |flow| {
            flow.select_file(&file_name)?.begin_upload()
        })
        .await?;

    let object_key = format!("receipts/{}-{}", entry.uuid, sanitize_file_name(&file_name));

    if let Err(err) = app_state
        .receipt_store
        .put_object(&object_key, &bytes, &content_type)
        .await
    {
        if let Err(flow_err) = app_state
            .transition_attachment_flow(entry_id, |flow| flow.fail_upload())
            .await
        {
            tracing::warn!("failed to roll back attachment flow: {}", flow_err);
        }
        return Err(err.into());
    }

    app_state
        .transition_attachment_flow(entry_id, |flow| {
            flow.progress(100)?.complete_upload(object_key.clone())
        })
        .await?;

    let url = app_state.receipt_store.signed_url(&object_key)?;

    Ok(Json(UploadImageResponse {
        message: "Your receipt image has been uploaded!".to_string(),
        image: object_key,
        url,
    }))
}

#[instrument(name = "clear_receipt_image", skip(app_state))]
pub async fn clear_receipt_image(
    user: AuthUser,
    Path(entry_id): Path<i32>,
    State(app_state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    find_owned_entry(&app_state, entry_id, &user).await?;

    app_state
        .transition_attachment_flow(entry_id, |flow| flow.clear_selection())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn extract_image_from_multipart(
    multipart: &mut Multipart,
) -> Result<(String, String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("failed to parse multipart field"))?
    {
        if field.name() != Some("receipt") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("missing receipt file name"))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("failed to read receipt payload"))?;

        return Ok((file_name, content_type, bytes.to_vec()));
    }

    Err(ApiError::bad_request("missing receipt file field"))
}

fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

// ============================================================================
// Create Receipt
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReceiptPayload {
    form_params: ReceiptFormParams,
    rec_image: String,
    // RFC 3339 with an explicit offset; normalized to UTC on write.
    #[serde(with = "time::serde::rfc3339")]
    date_iso: time::OffsetDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptFormParams {
    #[serde(default)]
    desc: String,
    amount: f64,
    #[serde(default)]
    commission: f64,
    currency: String,
    exchange_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceiptResponse {
    message: String,
    image: String,
    data: ReceiptRow,
}

#[instrument(name = "create_receipt", skip(app_state, body))]
pub async fn create_receipt(
    user: AuthUser,
    Path(entry_id): Path<i32>,
    State(app_state): State<AppState>,
    Json(body): Json<NewReceiptPayload>,
) -> Result<Json<CreateReceiptResponse>, ApiError> {
    let entry = find_owned_entry(&app_state, entry_id, &user).await?;
    validate_receipt_form(&body.form_params)?;

    // Metadata can only be submitted against a completed upload.
    let submitted = app_state
        .transition_attachment_flow(entry_id, |flow| flow.submit_metadata())
        .await?;
    let Some(object_key) = submitted.object_key().map(str::to_string) else {
        return Err(ApiError::internal("submitted flow is missing its object key"));
    };

    if body.rec_image != object_key {
        roll_back_submission(&app_state, entry_id).await;
        return Err(ApiError::conflict(
            "receipt image does not match the uploaded object",
        ));
    }

    let form = &body.form_params;
    let new_receipt = NewReceipt {
        time_entry_id: entry.id,
        url: object_key.clone(),
        description: form.desc.clone(),
        amount: form.amount.to_string(),
        currency: form.currency.clone(),
        exchange_rate: form.exchange_rate.to_string(),
        date_of_receipt: body.date_iso.to_offset(UtcOffset::UTC),
    };

    let receipt = match app_state.receipt_repo.create_receipt(&new_receipt).await {
        Ok(receipt) => receipt,
        Err(err) => {
            // The object is still stored, so the user can retry the form.
            roll_back_submission(&app_state, entry_id).await;
            return Err(err.into());
        }
    };

    app_state
        .transition_attachment_flow(entry_id, |flow| flow.reset())
        .await?;

    Ok(Json(CreateReceiptResponse {
        message: "Your Receipt has been created!".to_string(),
        image: object_key,
        data: receipt,
    }))
}

async fn roll_back_submission(app_state: &AppState, entry_id: i32) {
    if let Err(err) = app_state
        .transition_attachment_flow(entry_id, |flow| flow.fail_submission())
        .await
    {
        tracing::warn!("failed to roll back receipt submission: {}", err);
    }
}

fn validate_receipt_form(form: &ReceiptFormParams) -> Result<(), ApiError> {
    if form.currency.trim().is_empty() {
        return Err(ApiError::bad_request("The currency field is required"));
    }
    if !(0.0..=MAX_AMOUNT).contains(&form.amount) {
        return Err(ApiError::bad_request("Maximum Amount is 5,000,000"));
    }
    if !(0.0..=MAX_COMMISSION).contains(&form.commission) {
        return Err(ApiError::bad_request("Maximum Commission is 100"));
    }
    if !(0.0..=MAX_EXCHANGE_RATE).contains(&form.exchange_rate) {
        return Err(ApiError::bad_request("Maximum Exchange Rate is 5,000,000"));
    }

    Ok(())
}

// ============================================================================
// Entry Receipts
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    #[serde(flatten)]
    receipt: ReceiptRow,
    signed_url: String,
}

#[instrument(name = "entry_receipts", skip(app_state))]
pub async fn entry_receipts(
    user: AuthUser,
    Path(entry_id): Path<i32>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ReceiptResponse>>, ApiError> {
    find_owned_entry(&app_state, entry_id, &user).await?;

    let receipts = app_state
        .receipt_repo
        .receipts_for_entry(entry_id)
        .await?
        .into_iter()
        .map(|receipt| {
            let signed_url = app_state.receipt_store.signed_url(&receipt.url)?;
            Ok(ReceiptResponse {
                receipt,
                signed_url,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(receipts))
}
