//! Handler-level tests of the analysis proxy contract.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::to_bytes;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;
use std::sync::Arc;

use dao_analyst::server::http::{analyze_handler, AnalyzeRequest};
use dao_analyst::server::ServerState;
use dao_analyst::synthesis::ReportGenerator;

struct FailingGenerator;

#[async_trait]
impl ReportGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("provider unreachable"))
    }
}

struct PanickingGenerator;

#[async_trait]
impl ReportGenerator for PanickingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        panic!("generator defect")
    }
}

fn state() -> ServerState {
    ServerState {
        generator: Arc::new(FailingGenerator),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_proposal_url_is_a_400() {
    let response = analyze_handler(
        State(state()),
        Json(AnalyzeRequest {
            proposal_url: String::new(),
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Proposal URL is required");
}

#[tokio::test(start_paused = true)]
async fn an_internal_failure_is_a_500_with_an_error_body() {
    let response = analyze_handler(
        State(ServerState {
            generator: Arc::new(PanickingGenerator),
        }),
        Json(AnalyzeRequest {
            proposal_url: "https://snapshot.org/#/dao.eth/proposal/0xabc".to_string(),
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test(start_paused = true)]
async fn a_successful_run_returns_the_report_as_json() {
    let response = analyze_handler(
        State(state()),
        Json(AnalyzeRequest {
            proposal_url: "https://snapshot.org/#/dao.eth/proposal/0xabc".to_string(),
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    // Full camelCase report schema on the wire.
    assert!(body["summary"].is_string());
    assert!(body["risks"].is_array());
    assert!(body["financialData"]["requestedAmount"].is_string());
    assert!(body["securityScore"].is_u64());
    assert!(body["recommendation"].is_string());
    assert!(body["securityProfile"]["auditStatus"].is_string());
}
