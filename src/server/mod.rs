//! Analysis proxy server
//!
//! Hosts the orchestration pipeline behind an HTTP boundary so browser
//! clients never hold the LLM credential. The same orchestrator runs here
//! as in the CLI; only where the synthesis call is issued changes.

pub mod http;

use crate::config::Config;
use crate::llm::LlmClient;
use crate::synthesis::{LlmReportGenerator, ReportGenerator};
use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    pub generator: Arc<dyn ReportGenerator>,
}

/// Start the analysis proxy server
pub async fn start(config: Config, host: &str, port: u16) -> Result<()> {
    let client = LlmClient::from_config(&config.llm)?;
    let generator: Arc<dyn ReportGenerator> =
        Arc::new(LlmReportGenerator::new(client, config.llm.model.clone()));

    let app = router(ServerState { generator });

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("analysis server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the application router. Cross-origin requests are fully open; the
/// CORS layer also answers pre-flight requests.
pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/analyze", post(http::analyze_handler))
        .route("/api/status", get(http::status_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
