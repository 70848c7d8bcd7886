//! The `AgentHandler` contract — the one operation orchestrators invoke —
//! and `AgentResult`, what a handler returns.

use crate::duration::DurationMs;
use crate::error::AgentError;
use crate::event::Event;
use crate::state::State;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// What a handler returns from one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// The output state. Never the same instance as the input — an agent
    /// clones its input before producing a new state.
    pub output: State,
    /// Optional error description, kept for tracing even when an error is
    /// also returned through the normal `Result::Err` channel.
    pub error: Option<String>,
    /// When this invocation started.
    #[serde(with = "crate::systime")]
    pub started_at: SystemTime,
    /// When this invocation ended.
    #[serde(with = "crate::systime")]
    pub ended_at: SystemTime,
    /// Wall-clock duration of the invocation.
    pub duration: DurationMs,
}

impl AgentResult {
    /// Build a successful result, computing duration from the two
    /// timestamps.
    pub fn success(output: State, started_at: SystemTime, ended_at: SystemTime) -> Self {
        let duration = ended_at
            .duration_since(started_at)
            .unwrap_or_default()
            .into();
        Self {
            output,
            error: None,
            started_at,
            ended_at,
            duration,
        }
    }

    /// Build a result carrying an error description alongside whatever
    /// output state the agent managed to produce (often just its input,
    /// cloned unchanged).
    pub fn failed(
        output: State,
        error: impl Into<String>,
        started_at: SystemTime,
        ended_at: SystemTime,
    ) -> Self {
        let duration = ended_at
            .duration_since(started_at)
            .unwrap_or_default()
            .into();
        Self {
            output,
            error: Some(error.into()),
            started_at,
            ended_at,
            duration,
        }
    }
}

/// The one operation orchestrators invoke. Implementers include
/// LLM-backed agents, tool-invoking agents, pure transformers, and error
/// handlers — the core does not prescribe how an agent produces its
/// output.
///
/// A handler must never mutate its input `State` in place; `&State` makes
/// that the type-level default, and any handler that wants to build on
/// the input clones it first (`State` is cheap to `Clone`, being plain
/// owned maps).
#[async_trait]
pub trait AgentHandler: Send + Sync {
    /// Execute one invocation, producing a new state from the event and
    /// the current state.
    async fn run(&self, event: &Event, state: &State) -> Result<AgentResult, AgentError>;
}

/// Capability hint a loopable agent may implement to advise the loop
/// orchestrator of a natural stop predicate (§9 redesign note: a tagged
/// capability rather than an "Agent" base-class hierarchy with Simple,
/// LLM, and Tool variants). The loop orchestrator's explicit `stop`
/// predicate, when supplied, always takes precedence over this hint.
pub trait ConvergenceHint {
    /// Return true when this agent's output state indicates convergence.
    fn has_converged(&self, state: &State) -> bool;
}
