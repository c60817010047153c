use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use songs::config::Settings;
use songs::db::Database;
use songs::routers::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_target(false)
        .init();

    info!("Running in {:?} mode", settings.mode);
    info!("Settings configured from environment: {:?}", settings.configured_keys);

    let database = Database::connect(&settings.database_url)
        .await
        .context("Failed to connect to database")?;
    info!("📊 Connected to song database");

    database
        .migrate()
        .await
        .context("Database migrations failed")?;
    info!("📊 Database migrations completed");

    let listener = tokio::net::TcpListener::bind(settings.listen_addr())
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen_addr()))?;

    info!("🎵 Song catalogue listening on {}", settings.listen_addr());
    info!("📡 Song endpoints: /songs, /songs/{{id}}, /songs/{{id}}/edit, /songs/{{id}}/delete");

    axum::serve(listener, app(database)).await?;
    Ok(())
}
