//! drillroom - mock-interview coaching backend
//!
//! A Rust backend implementing the interview session progression engine:
//! an AI interviewer asks generated questions, the user answers, and each
//! turn is acknowledged with feedback until the question budget is spent.

mod api;
mod db;
mod engine;
mod generator;
mod llm;
mod prompts;
mod transcript;

use api::{create_router, AppState};
use db::Database;
use llm::LlmConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drillroom=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let db_path = std::env::var("DRILLROOM_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.drillroom/drillroom.db")
    });

    let port: u16 = std::env::var("DRILLROOM_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    tracing::info!(path = %db_path, "Opening database");
    let db = Database::open(&db_path)?;

    // Initialize the LLM service
    let llm_config = LlmConfig::from_env();
    if !llm_config.has_api_key() {
        tracing::warn!("No OPENAI_API_KEY configured; generation requests will fail.");
    }
    let llm = llm_config.build_service();
    tracing::info!(model = %llm.model_id(), "LLM service initialized");

    // Create application state
    let state = AppState::new(db, llm);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state).layer(cors).layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("drillroom server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
