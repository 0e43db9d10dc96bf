//! Specialist task runners
//!
//! Each runner is an independently-progressing unit of work: it reports an
//! initial status, suspends at its external data-source boundaries, appends
//! findings as it goes and returns a typed brief for the synthesis stage.
//! Runners only ever touch the registry through partial updates.

pub mod financial;
pub mod governance;
pub mod security;

pub use financial::run_financial_analysis;
pub use governance::run_governance_analysis;
pub use security::run_security_scan;
