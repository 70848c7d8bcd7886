//! The Hook interface — the closed set of named points the callback
//! subsystem (`agentkit-callback`) and the runtime fire subscribers at,
//! plus the subscriber contract itself.

use crate::state::State;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where in the dispatch lifecycle a callback may fire.
///
/// Closed set, stable ordering. `OnToolInvoke`/`OnToolResult` and
/// `OnStateChange` are reserved — this core never fires them itself; they
/// exist so an external tool-runtime collaborator or a state-diffing
/// observer can plug into the same registry without the registry knowing
/// about tools or diffing.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// After intake validation, before orchestrator dispatch.
    BeforeEventHandling,
    /// After the orchestrator completes for this event.
    AfterEventHandling,
    /// Immediately before an agent's invocation (inside any resilience
    /// wrappers).
    BeforeAgentRun,
    /// Immediately after, success or failure.
    AfterAgentRun,
    /// Reserved: fired by an external tool-runtime collaborator.
    OnToolInvoke,
    /// Reserved: fired by an external tool-runtime collaborator.
    OnToolResult,
    /// Reserved: optional emission point for state diffs.
    OnStateChange,
}

/// Context passed to a callback subscriber at its firing point.
#[derive(Debug, Clone)]
pub struct HookContext<'a> {
    /// Which point is firing.
    pub point: HookPoint,
    /// The session this event belongs to.
    pub session_id: &'a str,
    /// The event id this invocation belongs to.
    pub event_id: &'a str,
    /// The agent involved, if any (set at `BeforeAgentRun`/`AfterAgentRun`).
    pub agent_id: Option<&'a str>,
}

/// Callback subscriber errors. These are logged and do NOT abort the
/// dispatch pipeline or the remaining subscribers — see
/// `agentkit-callback`'s `CallbackRegistry::dispatch`.
#[non_exhaustive]
#[derive(Debug, Error, Clone)]
pub enum CallbackError {
    /// The subscriber's handler returned a failure.
    #[error("callback failed: {0}")]
    Failed(String),
}

/// A named subscriber at a fixed hook point.
///
/// Subscribers may return a modified [`State`] — the modified state
/// becomes the input to the next subscriber in the pipeline, and
/// ultimately to the agent (for `Before*` hooks) or to downstream routing
/// (for `After*` hooks). Returning the input unchanged is always valid.
#[async_trait]
pub trait Callback: Send + Sync {
    /// Invoked when the registry dispatches this subscriber's hook point.
    /// Receives the current state and returns the (possibly unmodified)
    /// state to thread onward.
    async fn on_event(
        &self,
        ctx: &HookContext<'_>,
        state: State,
    ) -> Result<State, CallbackError>;
}

/// Blanket impl so a plain async closure-like function pointer can be
/// registered directly, mirroring how agents are often simple
/// transformers rather than full trait objects.
#[async_trait]
impl<F> Callback for F
where
    F: Fn(&HookContext<'_>, State) -> Result<State, CallbackError> + Send + Sync,
{
    async fn on_event(
        &self,
        ctx: &HookContext<'_>,
        state: State,
    ) -> Result<State, CallbackError> {
        self(ctx, state)
    }
}
