//! HTTP handlers for the analysis proxy

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::analyzer::{AnalyzeError, ProposalAnalyzer};
use crate::server::ServerState;

/// Analysis request body
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "proposalUrl", default)]
    pub proposal_url: String,
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
}

/// Run the full analysis pipeline for one proposal URL.
///
/// 400 when `proposalUrl` is absent or empty, 200 with the report on
/// success, 500 with `{error}` on internal failure.
pub async fn analyze_handler(
    State(state): State<ServerState>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    if req.proposal_url.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Proposal URL is required" })),
        )
            .into_response();
    }

    // A fresh analyzer per request: runs never share mutable state.
    let analyzer = ProposalAnalyzer::new(Arc::clone(&state.generator));

    // Drain status events into the log; the HTTP contract only carries the
    // final report.
    let mut events = analyzer.registry().subscribe();
    let event_log = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => debug!(
                    agent = %event.agent,
                    status = ?event.state.status,
                    progress = event.state.progress,
                    "agent update"
                ),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = analyzer.analyze(&req.proposal_url).await;
    event_log.abort();

    match result {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(AnalyzeError::EmptyProposal) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Proposal URL is required" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Health/status handler
pub async fn status_handler() -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}
