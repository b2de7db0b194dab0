//! Skillforge Server
//!
//! Axum server exposing the analysis pipeline over HTTP. Configuration
//! comes from the environment (with `.env` support); CLI flags override
//! host, port and database path.

mod api;
mod settings;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use skillforge_core::pipeline::EventBus;
use skillforge_core::search::SearchApiClient;
use skillforge_core::session::OfflineSessions;
use skillforge_core::state::{AnalysisCache, MemoryJobStore, SkillforgeDb};
use skillforge_core::Orchestrator;

use api::{AppState, SharedState};
use settings::Settings;

#[derive(Parser)]
#[command(name = "skillforge", about = "Skill gap analysis and resource curation server")]
struct Cli {
    /// Bind address override
    #[arg(long)]
    host: Option<String>,

    /// Port override
    #[arg(long)]
    port: Option<u16>,

    /// Database path override
    #[arg(long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(db) = cli.db {
        settings.db_path = db;
    }

    let db = SkillforgeDb::open_at(&settings.db_path)
        .with_context(|| format!("opening database at {}", settings.db_path))?;
    let cache = settings
        .enable_cache
        .then(|| AnalysisCache::new(db.connection()));

    let orchestrator = Orchestrator::new(
        settings.orchestrator_config(),
        // No agent runtime is wired in yet; the pipeline runs on its
        // search and static fallback tiers.
        Arc::new(OfflineSessions),
        Arc::new(SearchApiClient::new(
            settings.search_api_key.clone(),
            settings.search_api_endpoint.clone(),
        )),
        Arc::new(MemoryJobStore::default()),
        cache,
        EventBus::disabled(),
    );

    let state: SharedState = Arc::new(AppState { orchestrator });

    let app = Router::new()
        .route("/api/v1/analyze", post(api::analyze))
        .route("/api/v1/status/:job_id", get(api::job_status))
        .route("/api/v1/resources/:skill_name", get(api::skill_resources))
        .route("/api/v1/feedback", post(api::feedback))
        .route("/health", get(api::health))
        .route("/api-docs/openapi.json", get(api::openapi_doc))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .context("invalid host/port")?;
    tracing::info!(%addr, "skillforge server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
