mod analysis;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::extractor::PdfTextExtractor;
use crate::analysis::pipeline::AnalysisPipeline;
use crate::analysis::store::PgDocumentStore;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::OpenAiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL document store
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;
    let store = PgDocumentStore::new(db);

    // Initialize LLM client
    let llm = OpenAiClient::new(config.openai_settings())?;
    info!("LLM client initialized (model: {})", llm.model());

    let pipeline = AnalysisPipeline::new(Arc::new(PdfTextExtractor), Arc::new(llm), Arc::new(store))
        .with_max_resume_chars(config.max_resume_chars);

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = build_router(state, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
