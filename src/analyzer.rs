//! Analysis orchestrator
//!
//! Top-level coordinator for a single proposal analysis run: validates the
//! request, resets the registry, fans out the three specialist runners,
//! hands their briefs to the synthesis stage and drives the orchestrator
//! and analyst pseudo-task updates. One call to [`ProposalAnalyzer::analyze`]
//! is one full traversal of the run state machine; no state survives a run
//! beyond what `reset_all` clears.

use crate::agents::{run_financial_analysis, run_governance_analysis, run_security_scan};
use crate::registry::{AgentId, AgentPhase, AgentRegistry, AgentUpdate};
use crate::synthesis::{ReportGenerator, ReportSynthesizer};
use crate::types::AnalysisResult;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

// Pacing of the orchestrator pseudo-task between its own phases.
const URL_PARSE_DELAY: Duration = Duration::from_millis(1000);
const DELEGATION_DELAY: Duration = Duration::from_millis(800);
const AGGREGATION_DELAY: Duration = Duration::from_millis(500);
const SYNTHESIS_HANDOFF_DELAY: Duration = Duration::from_millis(1000);

/// Failures that reach the caller. Synthesis problems never appear here;
/// those are absorbed by the fallback resolver.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("proposal URL must not be empty")]
    EmptyProposal,
    #[error("{agent} agent failed: {source}")]
    TaskFailed {
        agent: AgentId,
        #[source]
        source: anyhow::Error,
    },
    #[error("analysis pipeline failed: {0}")]
    Internal(#[source] anyhow::Error),
}

/// The top-level analysis pipeline for one proposal at a time.
pub struct ProposalAnalyzer {
    registry: AgentRegistry,
    synthesizer: Arc<ReportSynthesizer>,
}

impl ProposalAnalyzer {
    pub fn new(generator: Arc<dyn ReportGenerator>) -> Self {
        Self {
            registry: AgentRegistry::new(),
            synthesizer: Arc::new(ReportSynthesizer::new(generator)),
        }
    }

    /// The registry this analyzer reports into. Subscribe before calling
    /// [`analyze`](Self::analyze) to observe the full run.
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Run the full pipeline for one proposal URL.
    ///
    /// An empty or blank URL is rejected before any registry mutation. Any
    /// error leaves the orchestrator pseudo-task in the `error` state rather
    /// than stuck mid-progress.
    pub async fn analyze(&self, proposal_url: &str) -> Result<AnalysisResult, AnalyzeError> {
        if proposal_url.trim().is_empty() {
            return Err(AnalyzeError::EmptyProposal);
        }

        let run_id = Uuid::new_v4();
        info!("analysis run {run_id} started for {proposal_url}");

        self.registry.reset_all().await;

        match self.run(proposal_url).await {
            Ok(report) => {
                info!("analysis run {run_id} complete");
                Ok(report)
            }
            Err(e) => {
                warn!("analysis run {run_id} failed: {e}");
                self.registry
                    .update(
                        AgentId::Orchestrator,
                        AgentUpdate::new().status(AgentPhase::Error),
                    )
                    .await;
                Err(e)
            }
        }
    }

    async fn run(&self, proposal_url: &str) -> Result<AnalysisResult, AnalyzeError> {
        let registry = &self.registry;

        registry
            .update(
                AgentId::Orchestrator,
                AgentUpdate::new()
                    .status(AgentPhase::Processing)
                    .progress(10)
                    .finding("Parsing proposal URL...")
                    .finding("Identifying DAO platform..."),
            )
            .await;
        sleep(URL_PARSE_DELAY).await;

        registry
            .update(
                AgentId::Orchestrator,
                AgentUpdate::new()
                    .progress(30)
                    .finding("URL parsed successfully")
                    .finding("Delegating to specialist agents..."),
            )
            .await;
        sleep(DELEGATION_DELAY).await;

        // All three specialists run concurrently; the first failure fails
        // the join and with it the whole run.
        let (governance, security, financial) = tokio::try_join!(
            tagged(AgentId::Analyst, run_governance_analysis(registry, proposal_url)),
            tagged(AgentId::Sentinel, run_security_scan(registry, proposal_url)),
            tagged(AgentId::Economist, run_financial_analysis(registry, proposal_url)),
        )?;

        registry
            .update(
                AgentId::Orchestrator,
                AgentUpdate::new()
                    .progress(80)
                    .finding("All specialist agents complete")
                    .finding("Aggregating findings..."),
            )
            .await;
        sleep(AGGREGATION_DELAY).await;

        registry
            .update(
                AgentId::Analyst,
                AgentUpdate::new()
                    .status(AgentPhase::Processing)
                    .progress(20)
                    .finding("Receiving aggregated data...")
                    .finding("Beginning synthesis..."),
            )
            .await;
        sleep(SYNTHESIS_HANDOFF_DELAY).await;

        // Synthesis is fallback-guaranteed and cannot error; run it on its
        // own task so that even a panic there surfaces as a caller-visible
        // failure instead of leaving the registry stuck mid-run.
        let synthesizer = Arc::clone(&self.synthesizer);
        let synth_registry = registry.clone();
        let url = proposal_url.to_string();
        let report = tokio::spawn(async move {
            synthesizer
                .synthesize(&synth_registry, &url, &governance, &security, &financial)
                .await
        })
        .await
        .map_err(|e| AnalyzeError::Internal(anyhow::anyhow!("synthesis task failed: {e}")))?;

        registry
            .update(
                AgentId::Analyst,
                AgentUpdate::new()
                    .status(AgentPhase::Complete)
                    .progress(100)
                    .finding("Report generation complete")
                    .finding("Final recommendation compiled"),
            )
            .await;
        registry
            .update(
                AgentId::Orchestrator,
                AgentUpdate::new()
                    .status(AgentPhase::Complete)
                    .progress(100)
                    .finding("Analysis pipeline complete")
                    .finding("Presenting results to user"),
            )
            .await;

        Ok(report)
    }
}

/// Tag a runner's failure with the agent it belongs to.
async fn tagged<T>(
    agent: AgentId,
    task: impl Future<Output = anyhow::Result<T>>,
) -> Result<T, AnalyzeError> {
    task.await
        .map_err(|source| AnalyzeError::TaskFailed { agent, source })
}
