use axum::{http::header, http::Method, routing::get, Router};
use jsonwebtoken::DecodingKey;
use sqlx::PgPool;
use time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, config::Settings, routes, services::ReceiptStore};

pub async fn create(connection_pool: PgPool, config: Settings) -> anyhow::Result<Router<()>> {
    let receipt_store = ReceiptStore::new(
        config.storage.root_dir.clone(),
        &config.application.api_url,
        &config.storage.signing_key,
        Duration::minutes(config.storage.url_ttl_minutes),
    );
    receipt_store.initialize().await?;

    let app_state = AppState::new(
        connection_pool,
        receipt_store,
        DecodingKey::from_secret(config.auth.jwt_secret.as_bytes()),
    );

    let app = Router::new()
        .route("/", get(|| async { "timecapsule-api" }))
        .nest("/entries", routes::entries::router())
        .nest("/receipts", routes::receipts::router())
        .nest("/files", routes::files::router());

    let app_url = config.application.app_url.clone();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.to_str().unwrap_or_default() == app_url
        }));

    Ok(app
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default())))
}
