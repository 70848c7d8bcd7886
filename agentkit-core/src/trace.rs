//! `TraceEntry` — one row in a session's execution timeline, and the
//! shallow state snapshot it carries by default.

use crate::agent::AgentResult;
use crate::hook::HookPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::SystemTime;

/// A shallow snapshot of a [`crate::state::State`]'s key lists. Full value
/// capture is opt-in (`verbose`) and even then only records JSON type
/// shapes, never raw values, to avoid leaking sensitive payloads into
/// trace files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Keys present in the data space at capture time.
    pub data_keys: Vec<String>,
    /// Keys present in the metadata space at capture time.
    pub metadata_keys: Vec<String>,
    /// Present only when captured via `State::verbose_snapshot`: each data
    /// key's JSON type tag (`"string"`, `"number"`, ...), never the value.
    pub data_shapes: Option<HashMap<String, &'static str>>,
}

/// One row in a session's execution timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// When this entry was recorded.
    #[serde(with = "crate::systime")]
    pub at: SystemTime,
    /// Which hook point this entry corresponds to.
    pub hook: HookPoint,
    /// The session this entry belongs to.
    pub session_id: String,
    /// The event this entry belongs to.
    pub event_id: String,
    /// The agent this entry concerns, if any.
    pub agent_id: Option<String>,
    /// For re-routing: the agent being routed to.
    pub target_agent_id: Option<String>,
    /// For re-routing: the agent that produced the follow-up.
    pub source_agent_id: Option<String>,
    /// The agent's result, if this entry wraps an agent invocation.
    pub result: Option<AgentResult>,
    /// An error description, if this entry records a failure.
    pub error: Option<String>,
    /// Whether the failure recorded here is `ErrorKind::Critical`.
    pub critical: bool,
    /// A shallow snapshot of the state involved.
    pub snapshot: StateSnapshot,
}

impl TraceEntry {
    /// Build a minimal entry for a hook point with no agent/result
    /// context (e.g. `BeforeEventHandling`/`AfterEventHandling`).
    pub fn for_event(
        hook: HookPoint,
        session_id: impl Into<String>,
        event_id: impl Into<String>,
        snapshot: StateSnapshot,
    ) -> Self {
        Self {
            at: SystemTime::now(),
            hook,
            session_id: session_id.into(),
            event_id: event_id.into(),
            agent_id: None,
            target_agent_id: None,
            source_agent_id: None,
            result: None,
            error: None,
            critical: false,
            snapshot,
        }
    }

    /// Build an entry for an agent invocation (`BeforeAgentRun`/`AfterAgentRun`).
    pub fn for_agent(
        hook: HookPoint,
        session_id: impl Into<String>,
        event_id: impl Into<String>,
        agent_id: impl Into<String>,
        snapshot: StateSnapshot,
    ) -> Self {
        let mut entry = Self::for_event(hook, session_id, event_id, snapshot);
        entry.agent_id = Some(agent_id.into());
        entry
    }

    /// Attach an agent result to this entry.
    pub fn with_result(mut self, result: AgentResult) -> Self {
        self.result = Some(result);
        self
    }

    /// Attach an error description to this entry.
    pub fn with_error(mut self, error: impl Into<String>, critical: bool) -> Self {
        self.error = Some(error.into());
        self.critical = critical;
        self
    }
}
