//! `SequentialOrchestrator` — an ordered chain of agents, threading
//! output state as input to the next.

use crate::support::invoke_agent;
use agentkit_callback::CallbackRegistry;
use agentkit_core::{AgentHandler, Event, OrchError, Orchestrator, OrchestratorOutcome, State};
use agentkit_trace::TraceLogger;
use async_trait::async_trait;
use std::sync::Arc;

/// Executes a fixed, ordered list of agents serially for a given event,
/// threading each agent's output state into the next. The chain is
/// configured at construction, not derived from events — unlike the
/// route orchestrator, there is no re-dispatch through the queue between
/// steps.
pub struct SequentialOrchestrator {
    agents: Vec<(String, Arc<dyn AgentHandler>)>,
    continue_on_error: bool,
    callbacks: Arc<CallbackRegistry>,
    trace: Arc<dyn TraceLogger>,
}

impl SequentialOrchestrator {
    /// Create an orchestrator over the given ordered `(name, handler)`
    /// chain. When `continue_on_error` is false (the default policy),
    /// the chain stops at the first failing agent and that agent's input
    /// state becomes the trajectory's final state.
    pub fn new(
        agents: Vec<(String, Arc<dyn AgentHandler>)>,
        continue_on_error: bool,
        callbacks: Arc<CallbackRegistry>,
        trace: Arc<dyn TraceLogger>,
    ) -> Self {
        Self {
            agents,
            continue_on_error,
            callbacks,
            trace,
        }
    }
}

#[async_trait]
impl Orchestrator for SequentialOrchestrator {
    async fn dispatch(&self, event: &Event, state: State) -> Result<OrchestratorOutcome, OrchError> {
        let mut current = state;
        for (name, agent) in &self.agents {
            match invoke_agent(name, agent, event, &current, &self.callbacks, self.trace.as_ref()).await {
                Ok(result) => current = result.output,
                Err(_) if self.continue_on_error => continue,
                Err(_) => break,
            }
        }
        Ok(OrchestratorOutcome::terminal(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkit_core::{AgentError, AgentResult};
    use agentkit_trace::InMemoryTraceLogger;
    use async_trait::async_trait as at;
    use std::time::SystemTime;

    struct Append(&'static str);
    #[at]
    impl AgentHandler for Append {
        async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
            let mut out = state.clone();
            let prior = out.get("trail").and_then(|v| v.as_str()).unwrap_or_default().to_string();
            out.set("trail", serde_json::json!(format!("{prior}{}", self.0)));
            let now = SystemTime::now();
            Ok(AgentResult::success(out, now, now))
        }
    }

    struct FailsAt(&'static str);
    #[at]
    impl AgentHandler for FailsAt {
        async fn run(&self, _event: &Event, _state: &State) -> Result<AgentResult, AgentError> {
            Err(AgentError::Transient(format!("{} failed", self.0)))
        }
    }

    fn support() -> (Arc<CallbackRegistry>, Arc<InMemoryTraceLogger>) {
        (Arc::new(CallbackRegistry::new()), Arc::new(InMemoryTraceLogger::new()))
    }

    #[tokio::test]
    async fn chain_threads_output_to_next_input() {
        let (cb, tr) = support();
        let agents: Vec<(String, Arc<dyn AgentHandler>)> = vec![
            ("a".into(), Arc::new(Append("a"))),
            ("b".into(), Arc::new(Append("b"))),
            ("c".into(), Arc::new(Append("c"))),
        ];
        let o = SequentialOrchestrator::new(agents, false, cb, tr);
        let event = Event::untargeted(Default::default());
        let outcome = o.dispatch(&event, State::new()).await.unwrap();
        assert_eq!(outcome.state.get("trail"), Some(&serde_json::json!("abc")));
    }

    #[tokio::test]
    async fn stops_at_first_failure_by_default() {
        let (cb, tr) = support();
        let agents: Vec<(String, Arc<dyn AgentHandler>)> = vec![
            ("a".into(), Arc::new(Append("a"))),
            ("b".into(), Arc::new(FailsAt("b"))),
            ("c".into(), Arc::new(Append("c"))),
        ];
        let o = SequentialOrchestrator::new(agents, false, cb, tr);
        let event = Event::untargeted(Default::default());
        let outcome = o.dispatch(&event, State::new()).await.unwrap();
        assert_eq!(outcome.state.get("trail"), Some(&serde_json::json!("a")));
    }

    #[tokio::test]
    async fn continue_on_error_skips_failed_step() {
        let (cb, tr) = support();
        let agents: Vec<(String, Arc<dyn AgentHandler>)> = vec![
            ("a".into(), Arc::new(Append("a"))),
            ("b".into(), Arc::new(FailsAt("b"))),
            ("c".into(), Arc::new(Append("c"))),
        ];
        let o = SequentialOrchestrator::new(agents, true, cb, tr);
        let event = Event::untargeted(Default::default());
        let outcome = o.dispatch(&event, State::new()).await.unwrap();
        assert_eq!(outcome.state.get("trail"), Some(&serde_json::json!("ac")));
    }
}
