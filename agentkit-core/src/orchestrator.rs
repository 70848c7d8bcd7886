//! The Orchestrator contract — the one operation all five scheduling
//! disciplines (`agentkit-orch`) implement.

use crate::error::ErrorKind;
use crate::event::Event;
use crate::state::State;
use async_trait::async_trait;
use thiserror::Error;

/// Errors an orchestrator can return to the Runner.
#[non_exhaustive]
#[derive(Debug, Error, Clone)]
pub enum OrchError {
    /// No target could be resolved for an event (§4.2.1) and no default
    /// error handler is configured.
    #[error("no route: {0}")]
    NoRoute(String),

    /// The named agent is not registered.
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// Catch-all for orchestrator-internal failures.
    #[error("{0}")]
    Other(String),
}

impl OrchError {
    /// Classify into the shared [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchError::NoRoute(_) => ErrorKind::Routing,
            OrchError::AgentNotFound(_) => ErrorKind::NotFound,
            OrchError::Other(_) => ErrorKind::Unknown,
        }
    }
}

/// What an orchestrator produces for one event.
#[derive(Debug, Clone)]
pub struct OrchestratorOutcome {
    /// The final state after this orchestrator's policy ran to
    /// completion.
    pub state: State,
    /// A follow-up event to re-enqueue, if this orchestrator's policy
    /// re-dispatches (only the route orchestrator does this; all others
    /// always return `None` here since they own their own fan-out/chain
    /// internally).
    pub followup: Option<Event>,
}

impl OrchestratorOutcome {
    /// A terminal outcome: no follow-up event.
    pub fn terminal(state: State) -> Self {
        Self {
            state,
            followup: None,
        }
    }

    /// A re-dispatching outcome.
    pub fn with_followup(state: State, followup: Event) -> Self {
        Self {
            state,
            followup: Some(followup),
        }
    }
}

/// Given an event and its initial state (derived from the event's data
/// and metadata), decide how many agents run, in what order or
/// concurrency, and how their outputs combine.
///
/// Agent lookups are resolved from a name→handler registry supplied at
/// construction of the concrete orchestrator — this trait only describes
/// the policy, not the registry.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Run this orchestrator's policy for one event, returning the final
    /// state and, if applicable, a follow-up event for re-dispatch.
    async fn dispatch(&self, event: &Event, state: State) -> Result<OrchestratorOutcome, OrchError>;
}
