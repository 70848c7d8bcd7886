//! `MixedOrchestrator` — a parallel fan-out phase followed by a serial
//! chain phase.

use crate::collaborative::{CollaborativeOrchestrator, FailurePolicy};
use crate::sequential::SequentialOrchestrator;
use agentkit_callback::CallbackRegistry;
use agentkit_core::{AgentHandler, Event, OrchError, Orchestrator, OrchestratorOutcome, State};
use agentkit_trace::TraceLogger;
use async_trait::async_trait;
use std::sync::Arc;

/// Phase 1 runs `parallel_agents` concurrently (collaborative
/// semantics); phase 2 runs `serial_agents` in order over the merged
/// result. Either phase may be empty.
pub struct MixedOrchestrator {
    parallel: CollaborativeOrchestrator,
    sequential: SequentialOrchestrator,
}

impl MixedOrchestrator {
    /// Build a two-phase orchestrator.
    pub fn new(
        parallel_agents: Vec<(String, Arc<dyn AgentHandler>)>,
        parallel_failure_policy: FailurePolicy,
        max_concurrency: Option<usize>,
        serial_agents: Vec<(String, Arc<dyn AgentHandler>)>,
        continue_on_error: bool,
        callbacks: Arc<CallbackRegistry>,
        trace: Arc<dyn TraceLogger>,
    ) -> Self {
        Self {
            parallel: CollaborativeOrchestrator::new(
                parallel_agents,
                parallel_failure_policy,
                max_concurrency,
                Arc::clone(&callbacks),
                Arc::clone(&trace),
            ),
            sequential: SequentialOrchestrator::new(serial_agents, continue_on_error, callbacks, trace),
        }
    }
}

#[async_trait]
impl Orchestrator for MixedOrchestrator {
    async fn dispatch(&self, event: &Event, state: State) -> Result<OrchestratorOutcome, OrchError> {
        let phase1 = self.parallel.dispatch(event, state).await?;
        self.sequential.dispatch(event, phase1.state).await
    }
}
