mod auth;
mod config;
mod db;
mod errors;
mod feedback;
mod llm_client;
mod mailer;
mod models;
mod routes;
mod session;
mod state;
mod techstack;
mod vapi;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::mailer::Mailer;
use crate::routes::build_router;
use crate::session::cache::RedisSessionCache;
use crate::session::coordinator::InterviewCoordinator;
use crate::session::store::PgInterviewStore;
use crate::state::AppState;
use crate::vapi::VapiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vocalis API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize voice provider client
    let vapi = VapiClient::new(
        config.vapi_base_url.clone(),
        config.vapi_org_id.clone(),
        config.vapi_private_key.clone(),
        config.vapi_assistant_id.clone(),
    );
    info!("Voice provider client initialized");

    // Initialize mailer (optional)
    let mailer = match &config.smtp {
        Some(smtp) => Some(Mailer::from_config(smtp)?),
        None => {
            warn!("SMTP not configured; outbound email disabled");
            None
        }
    };

    // The coordinator owns the cache and store seams so tests can swap in
    // in-memory fakes.
    let coordinator = Arc::new(InterviewCoordinator::new(
        Arc::new(RedisSessionCache::new(redis.clone())),
        Arc::new(PgInterviewStore::new(db.clone())),
    ));

    // Build app state
    let state = AppState {
        db,
        redis,
        llm,
        vapi,
        mailer,
        coordinator,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
