//! `LoopOrchestrator` — repeatedly invoke one agent, feeding its output
//! back as input, until convergence, an iteration cap, or a deadline.

use crate::support::invoke_agent;
use agentkit_callback::CallbackRegistry;
use agentkit_core::{AgentHandler, Event, OrchError, Orchestrator, OrchestratorOutcome, State};
use agentkit_trace::TraceLogger;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Why a loop trajectory stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `stop(state)` returned true between iterations.
    Converged,
    /// `max_iterations` was reached.
    MaxIterations,
    /// `max_duration` elapsed.
    Timeout,
    /// An invocation failed.
    Error,
}

impl StopReason {
    fn as_str(self) -> &'static str {
        match self {
            StopReason::Converged => "converged",
            StopReason::MaxIterations => "max_iterations",
            StopReason::Timeout => "timeout",
            StopReason::Error => "error",
        }
    }
}

/// Repeatedly invokes one agent, each iteration atomic, feeding its
/// output state back in as the next iteration's input, until a
/// caller-supplied `stop` predicate returns true, `max_iterations` is
/// reached, or `max_duration` elapses.
pub struct LoopOrchestrator {
    name: String,
    agent: Arc<dyn AgentHandler>,
    stop: Arc<dyn Fn(&State) -> bool + Send + Sync>,
    max_iterations: u32,
    max_duration: Option<Duration>,
    callbacks: Arc<CallbackRegistry>,
    trace: Arc<dyn TraceLogger>,
}

impl LoopOrchestrator {
    /// Create a loop over `agent`, stopping as soon as `stop` returns
    /// true, `max_iterations` iterations have run (0 runs the agent
    /// zero times), or `max_duration` (if set) elapses.
    pub fn new(
        name: impl Into<String>,
        agent: Arc<dyn AgentHandler>,
        stop: Arc<dyn Fn(&State) -> bool + Send + Sync>,
        max_iterations: u32,
        max_duration: Option<Duration>,
        callbacks: Arc<CallbackRegistry>,
        trace: Arc<dyn TraceLogger>,
    ) -> Self {
        Self {
            name: name.into(),
            agent,
            stop,
            max_iterations,
            max_duration,
            callbacks,
            trace,
        }
    }
}

#[async_trait]
impl Orchestrator for LoopOrchestrator {
    async fn dispatch(&self, event: &Event, state: State) -> Result<OrchestratorOutcome, OrchError> {
        let start = std::time::Instant::now();
        let mut current = state;
        let mut iterations = 0u32;
        let mut reason = StopReason::MaxIterations;

        loop {
            if iterations >= self.max_iterations {
                reason = StopReason::MaxIterations;
                break;
            }
            if let Some(deadline) = self.max_duration {
                if start.elapsed() >= deadline {
                    reason = StopReason::Timeout;
                    break;
                }
            }

            match invoke_agent(&self.name, &self.agent, event, &current, &self.callbacks, self.trace.as_ref()).await {
                Ok(result) => {
                    current = result.output;
                    iterations += 1;
                    if (self.stop)(&current) {
                        reason = StopReason::Converged;
                        break;
                    }
                }
                Err(_) => {
                    reason = StopReason::Error;
                    break;
                }
            }
        }

        current.set("loop_iterations", serde_json::json!(iterations));
        current.set("loop_stop_reason", serde_json::json!(reason.as_str()));
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

    struct Increment;
    #[at]
    impl AgentHandler for Increment {
        async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
            let mut out = state.clone();
            let n = out.get("n").and_then(|v| v.as_i64()).unwrap_or(0);
            out.set("n", serde_json::json!(n + 1));
            let now = SystemTime::now();
            Ok(AgentResult::success(out, now, now))
        }
    }

    fn support() -> (Arc<CallbackRegistry>, Arc<InMemoryTraceLogger>) {
        (Arc::new(CallbackRegistry::new()), Arc::new(InMemoryTraceLogger::new()))
    }

    #[tokio::test]
    async fn stops_on_convergence_predicate() {
        let (cb, tr) = support();
        let stop: Arc<dyn Fn(&State) -> bool + Send + Sync> =
            Arc::new(|s: &State| s.get("n").and_then(|v| v.as_i64()).unwrap_or(0) >= 3);
        let o = LoopOrchestrator::new("inc", Arc::new(Increment), stop, 100, None, cb, tr);
        let event = Event::untargeted(Default::default());
        let outcome = o.dispatch(&event, State::new()).await.unwrap();
        assert_eq!(outcome.state.get("n"), Some(&serde_json::json!(3)));
        assert_eq!(outcome.state.get("loop_stop_reason"), Some(&serde_json::json!("converged")));
    }

    #[tokio::test]
    async fn stops_on_max_iterations() {
        let (cb, tr) = support();
        let stop: Arc<dyn Fn(&State) -> bool + Send + Sync> = Arc::new(|_: &State| false);
        let o = LoopOrchestrator::new("inc", Arc::new(Increment), stop, 5, None, cb, tr);
        let event = Event::untargeted(Default::default());
        let outcome = o.dispatch(&event, State::new()).await.unwrap();
        assert_eq!(outcome.state.get("n"), Some(&serde_json::json!(5)));
        assert_eq!(outcome.state.get("loop_stop_reason"), Some(&serde_json::json!("max_iterations")));
    }

    #[tokio::test]
    async fn zero_max_iterations_never_runs_the_agent() {
        let (cb, tr) = support();
        let stop: Arc<dyn Fn(&State) -> bool + Send + Sync> = Arc::new(|_: &State| false);
        let o = LoopOrchestrator::new("inc", Arc::new(Increment), stop, 0, None, cb, tr);
        let event = Event::untargeted(Default::default());
        let outcome = o.dispatch(&event, State::new()).await.unwrap();
        assert_eq!(outcome.state.get("n"), None);
        assert_eq!(outcome.state.get("loop_iterations"), Some(&serde_json::json!(0)));
    }
}
