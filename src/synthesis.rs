//! Synthesis stage
//!
//! Turns the aggregated specialist briefs into the final report: builds the
//! analysis prompt, sends it through a [`ReportGenerator`], extracts a JSON
//! object from the free-text reply and merges in the specialist echoes.
//! Every failure path resolves through the deterministic fallback, so this
//! stage never fails outward.

use crate::fallback::fallback_report;
use crate::llm::{ChatMessage, LlmClient};
use crate::registry::{AgentId, AgentRegistry, AgentUpdate};
use crate::types::{AnalysisResult, FinancialBrief, GovernanceBrief, SecurityProfile};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str =
    "You are an expert DAO governance analyst. Always respond with valid JSON.";

const MAX_REPORT_TOKENS: u32 = 2048;

/// Where the synthesis prompt is actually sent.
///
/// The orchestration state machine has one implementation; only this
/// transport is swapped (production LLM call, test stubs).
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Production generator: chat completion against the configured provider.
pub struct LlmReportGenerator {
    client: LlmClient,
    model: String,
}

impl LlmReportGenerator {
    pub fn new(client: LlmClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ReportGenerator for LlmReportGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt.to_string()),
        ];
        self.client
            .complete(&self.model, messages, Some(MAX_REPORT_TOKENS))
            .await
    }
}

/// Builds the synthesis prompt, invokes the generator and shapes the reply.
pub struct ReportSynthesizer {
    generator: Arc<dyn ReportGenerator>,
}

impl ReportSynthesizer {
    pub fn new(generator: Arc<dyn ReportGenerator>) -> Self {
        Self { generator }
    }

    /// Produce the final report. Never fails: generation or parsing problems
    /// resolve through [`fallback_report`].
    pub async fn synthesize(
        &self,
        registry: &AgentRegistry,
        proposal_url: &str,
        governance: &GovernanceBrief,
        security: &SecurityProfile,
        financial: &FinancialBrief,
    ) -> AnalysisResult {
        registry
            .update(
                AgentId::Analyst,
                AgentUpdate::new()
                    .progress(60)
                    .finding("Calling AI model for synthesis..."),
            )
            .await;

        let prompt = build_prompt(proposal_url, governance, security, financial);
        debug!("synthesis prompt is {} chars", prompt.len());

        let reply = match self.generator.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("report generation failed, using fallback: {e:#}");
                return fallback_report(security, financial);
            }
        };

        match parse_report(&reply) {
            Ok(mut report) => {
                report.security_profile = Some(security.clone());
                report.financial_brief = Some(financial.clone());
                report
            }
            Err(e) => {
                warn!("could not parse synthesis reply, using fallback: {e:#}");
                fallback_report(security, financial)
            }
        }
    }
}

fn build_prompt(
    proposal_url: &str,
    governance: &GovernanceBrief,
    security: &SecurityProfile,
    financial: &FinancialBrief,
) -> String {
    let governance_json = serde_json::to_string(governance).unwrap_or_default();
    let security_json = serde_json::to_string(security).unwrap_or_default();
    let financial_json = serde_json::to_string(financial).unwrap_or_default();

    format!(
        r#"As an expert DAO proposal analyst, analyze this governance proposal URL: {proposal_url}.

Governance findings: {governance_json}
Security findings: {security_json}
Financial analysis: {financial_json}

Provide a comprehensive analysis with:
1. Executive Summary (2-3 sentences)
2. Key Risks (3 items with severity: High/Medium/Low)
3. Benefits (3 key benefits)
4. Financial Impact (requestedAmount, treasuryImpact, runwayReduction, marketImpact)
5. Security Score (0-100)
6. Community Sentiment
7. Final Recommendation

Format as JSON with keys: summary, risks (array of {{level, description}}), benefits (array), financialData ({{requestedAmount, treasuryImpact, runwayReduction, marketImpact}}), securityScore (number), sentiment, recommendation."#
    )
}

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("fence pattern compiles"));

/// Extract a JSON object from a free-text model reply: a fenced ```json
/// block wins, otherwise the widest top-level `{...}` span.
fn extract_json(text: &str) -> Option<&str> {
    if let Some(caps) = FENCED_JSON.captures(text) {
        return Some(caps.get(1)?.as_str());
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn parse_report(reply: &str) -> Result<AnalysisResult> {
    let raw = extract_json(reply).context("no JSON object in model reply")?;
    let report: AnalysisResult =
        serde_json::from_str(raw).context("model reply is not a valid report")?;
    if report.security_score > 100 {
        bail!("security score {} out of range", report.security_score);
    }
    Ok(report)
}
