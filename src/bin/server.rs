//! Camp API server: reads configuration from the environment (and `.env`), prepares the
//! store, mounts the common and resource routes, serves.

use camp_api::{
    app, ensure_database_exists, seed_sample_data, AppConfig, AppState, CampRepository,
    InMemoryCampRepository, PgCampRepository, RequestContext, StorageBackend,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("camp_api=info".parse()?))
        .init();

    let config = AppConfig::from_env()?;

    let repo: Arc<dyn CampRepository> = match &config.storage {
        StorageBackend::Postgres { database_url } => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await?;
            let repo = PgCampRepository::new(pool, &config.schema);
            repo.ensure_tables(&config.schema).await?;
            Arc::new(repo)
        }
        StorageBackend::Memory => {
            tracing::warn!("DATABASE_URL is not set; camps are kept in memory and lost on restart");
            Arc::new(InMemoryCampRepository::default())
        }
    };

    if config.seed_sample_data {
        seed_sample_data(repo.as_ref()).await?;
    }

    let mut state = AppState::new(repo);
    if let Some(base) = &config.public_base_url {
        state = state.with_public_base(RequestContext::from_base_url(base)?);
    }

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state, config.max_body_bytes)).await?;
    Ok(())
}
