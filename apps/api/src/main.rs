use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recruit_api::config::Config;
use recruit_api::providers::probe::HttpProber;
use recruit_api::routes::build_router;
use recruit_api::state::AppState;
use recruit_api::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recruit API v{}", env!("CARGO_PKG_VERSION"));

    // In-memory store; everything is lost on restart
    let store = if config.seed_sample_data {
        Store::seeded()?
    } else {
        Store::empty()
    };
    if store.resumes.is_empty() {
        info!("Starting without sample data");
    }
    info!(
        "Store ready: {} tasks, {} résumés, {} jobs, {} templates, {} providers",
        store.tasks.len(),
        store.resumes.len(),
        store.jobs.len(),
        store.templates.len(),
        store.providers.len()
    );

    // Provider connection tests go over real HTTP
    let prober = Arc::new(HttpProber::new(&config.probe_user_agent)?);
    info!(
        "Upload limits: {} bytes per file, {} files per task",
        config.max_upload_bytes, config.max_files_per_task
    );

    let state = AppState::new(store, config.clone(), prober);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
