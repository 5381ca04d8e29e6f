mod app_state;
mod auth;
mod config;
mod domain;
mod repositories;
mod router;
mod routes;
mod services;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::read_config()?;

    let connection_pool = PgPoolOptions::new().connect_lazy_with(config.database.with_db());
    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    let address = format!(
        "{}:{}",
        config.application.host, config.application.port
    );
    let app = router::create(connection_pool, config).await?;

    let listener = TcpListener::bind(&address).await?;
    tracing::info!("listening on {}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
