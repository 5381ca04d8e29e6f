use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{app_state::AppState, routes::ApiError};

pub fn router() -> Router<AppState> {
    Router::new().route("/*key", get(serve_object))
}

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    token: String,
}

/// Serves a stored receipt image. The `token` query parameter must be a
/// signed URL token minted for exactly this object key.
#[instrument(name = "GET /files/*key", skip(app_state, query))]
async fn serve_object(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ApiError> {
    app_state.receipt_store.verify_token(&key, &query.token)?;

    let (bytes, content_type) = app_state.receipt_store.get_object(&key).await?;

    let headers = [
        (header::CONTENT_TYPE, content_type),
        (header::CACHE_CONTROL, "private, max-age=900".to_string()),
    ];

    Ok((headers, bytes).into_response())
}
