mod analytics;
mod config;
mod db;
mod domain;
mod middleware;
mod services;
mod state;
mod web;

use crate::config::Config;
use crate::db::{MemoryStore, PgStore, SubmissionStore};
use crate::state::{AppState, SharedState};
use axum::{routing::get_service, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{
    compression::CompressionLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;

    let store: Arc<dyn SubmissionStore> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url, config.database_max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, submissions are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let shared: SharedState = Arc::new(AppState::new(&config, store));

    let scheduler = JobScheduler::new().await?;

    // Rate limiter cleanup - forget idle clients every hour
    let shared_for_cleanup = shared.clone();
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_uuid, _l| {
            let state = shared_for_cleanup.clone();
            Box::pin(async move {
                let submit = state.submit_limiter.purge_idle().await;
                let login = state.login_limiter.purge_idle().await;
                tracing::info!(
                    "Rate limiter cleanup done: {} submit and {} login clients tracked",
                    submit,
                    login
                );
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!("Scheduler started: rate limiter cleanup hourly");

    let index = format!("{}/index.html", config.static_dir);
    let static_handler = ServeDir::new(&config.static_dir).not_found_service(ServeFile::new(index));

    let app = Router::new()
        .merge(web::routes(shared.clone()))
        .fallback_service(get_service(static_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Share link: {}", shared.submit_url);
    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
