//! dao-analyst: multi-agent DAO governance proposal analyzer
//!
//! A proposal URL goes in; a structured analysis report comes out. Three
//! specialist agents (governance, security, financial) run concurrently
//! under an orchestrator, stream their progress through the
//! [`registry::AgentRegistry`], and feed an AI synthesis stage that always
//! resolves to a schema-valid [`types::AnalysisResult`] thanks to a
//! deterministic fallback. Ships as a CLI, a small HTTP proxy server, and a
//! gas-fee estimation utility.

pub mod agents;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod fallback;
pub mod gas;
pub mod llm;
pub mod registry;
pub mod server;
pub mod synthesis;
pub mod types;

pub use analyzer::{AnalyzeError, ProposalAnalyzer};
pub use registry::{AgentEvent, AgentId, AgentPhase, AgentRegistry, AgentState, AgentUpdate};
pub use types::AnalysisResult;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "dao-analyst";
