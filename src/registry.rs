//! Agent status registry
//!
//! Holds the live status, progress and findings of every named agent in a
//! run and fans each change out to subscribers. The registry is the only
//! shared mutable state in the pipeline; runners never touch the UI layer
//! directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Capacity of the update channel. A single run emits a few dozen events;
/// a lagging subscriber loses the oldest ones rather than blocking the run.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The closed set of agents participating in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    /// Top-level coordinator pseudo-task.
    Orchestrator,
    /// Governance specialist; also fronts the synthesis phase.
    Analyst,
    /// Security specialist.
    Sentinel,
    /// Financial specialist.
    Economist,
}

impl AgentId {
    pub const ALL: [AgentId; 4] = [
        AgentId::Orchestrator,
        AgentId::Analyst,
        AgentId::Sentinel,
        AgentId::Economist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Orchestrator => "orchestrator",
            AgentId::Analyst => "analyst",
            AgentId::Sentinel => "sentinel",
            AgentId::Economist => "economist",
        }
    }

    fn index(self) -> usize {
        match self {
            AgentId::Orchestrator => 0,
            AgentId::Analyst => 1,
            AgentId::Sentinel => 2,
            AgentId::Economist => 3,
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase of an agent within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentPhase {
    Idle,
    Processing,
    Complete,
    Error,
}

/// Current status of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub status: AgentPhase,
    /// 0-100, non-decreasing within a run.
    pub progress: u8,
    /// Append-only during a run; cleared on reset.
    pub findings: Vec<String>,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            status: AgentPhase::Idle,
            progress: 0,
            findings: Vec::new(),
        }
    }
}

/// Partial update merged into an agent's current state.
///
/// Unset fields are left untouched; `findings` are appended, never replaced.
#[derive(Debug, Clone, Default)]
pub struct AgentUpdate {
    status: Option<AgentPhase>,
    progress: Option<u8>,
    findings: Vec<String>,
}

impl AgentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: AgentPhase) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn finding(mut self, finding: impl Into<String>) -> Self {
        self.findings.push(finding.into());
        self
    }
}

/// A status change, published to every subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct AgentEvent {
    pub agent: AgentId,
    /// Merged snapshot of the agent's state after the update.
    pub state: AgentState,
    pub at: DateTime<Utc>,
}

/// Registry of all agent states with a broadcast update channel.
///
/// Updates interleave across concurrently running agents but each merge
/// completes atomically before the next begins.
#[derive(Clone)]
pub struct AgentRegistry {
    inner: Arc<RwLock<[AgentState; 4]>>,
    events: broadcast::Sender<AgentEvent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(Default::default())),
            events,
        }
    }

    /// Attach an observer. Any number of subscribers (UI, logging, tests)
    /// may listen independently.
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.events.subscribe()
    }

    /// Merge a partial update into the named agent's state and notify
    /// subscribers with the merged snapshot.
    pub async fn update(&self, agent: AgentId, update: AgentUpdate) {
        let snapshot = {
            let mut states = self.inner.write().await;
            let state = &mut states[agent.index()];
            if let Some(status) = update.status {
                state.status = status;
            }
            if let Some(progress) = update.progress {
                // Progress is monotonic within a run; only reset lowers it.
                state.progress = state.progress.max(progress.min(100));
            }
            state.findings.extend(update.findings);
            state.clone()
        };
        self.publish(agent, snapshot);
    }

    /// Reset every agent to idle with zero progress and no findings.
    pub async fn reset_all(&self) {
        {
            let mut states = self.inner.write().await;
            *states = Default::default();
        }
        for agent in AgentId::ALL {
            self.publish(agent, AgentState::default());
        }
    }

    /// Current state of one agent.
    pub async fn get(&self, agent: AgentId) -> AgentState {
        self.inner.read().await[agent.index()].clone()
    }

    /// Current state of all agents, in `AgentId::ALL` order.
    pub async fn snapshot(&self) -> Vec<(AgentId, AgentState)> {
        let states = self.inner.read().await;
        AgentId::ALL
            .iter()
            .map(|&agent| (agent, states[agent.index()].clone()))
            .collect()
    }

    fn publish(&self, agent: AgentId, state: AgentState) {
        // A send with no live receivers is not an error.
        let _ = self.events.send(AgentEvent {
            agent,
            state,
            at: Utc::now(),
        });
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
