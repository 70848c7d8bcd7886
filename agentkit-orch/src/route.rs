//! `RouteOrchestrator` — deliver one event to exactly one agent, letting
//! the agent's output state name the next hop for re-dispatch.

use crate::support::invoke_agent;
use agentkit_callback::CallbackRegistry;
use agentkit_core::state::ROUTE_TERMINATOR;
use agentkit_core::{AgentHandler, ErrorKind, Event, OrchError, Orchestrator, OrchestratorOutcome, State};
use agentkit_trace::TraceLogger;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Routes one event to one registered agent, named by `metadata.route`
/// (falling back to the event's initial target), and re-dispatches via a
/// follow-up event whenever the agent's output state names a different
/// non-terminal route.
///
/// Never invokes a second agent in-process for the same event: a chain
/// always goes back through the Runner's intake queue, preserving FIFO
/// fairness across concurrent sessions.
pub struct RouteOrchestrator {
    agents: HashMap<String, Arc<dyn AgentHandler>>,
    error_routing: HashMap<ErrorKind, String>,
    default_error_handler: Option<String>,
    callbacks: Arc<CallbackRegistry>,
    trace: Arc<dyn TraceLogger>,
}

impl RouteOrchestrator {
    /// Create an orchestrator with no registered agents and no error
    /// routing table.
    pub fn new(callbacks: Arc<CallbackRegistry>, trace: Arc<dyn TraceLogger>) -> Self {
        Self {
            agents: HashMap::new(),
            error_routing: HashMap::new(),
            default_error_handler: None,
            callbacks,
            trace,
        }
    }

    /// Register an agent under `name`.
    pub fn register(&mut self, name: impl Into<String>, agent: Arc<dyn AgentHandler>) {
        self.agents.insert(name.into(), agent);
    }

    /// Map an [`ErrorKind`] to the name of an agent that should handle
    /// failures of that kind.
    pub fn route_error(&mut self, kind: ErrorKind, handler: impl Into<String>) {
        self.error_routing.insert(kind, handler.into());
    }

    /// Set the agent invoked when neither `metadata.route` nor the
    /// event's target name an agent.
    pub fn set_default_error_handler(&mut self, handler: impl Into<String>) {
        self.default_error_handler = Some(handler.into());
    }
}

#[async_trait]
impl Orchestrator for RouteOrchestrator {
    async fn dispatch(&self, event: &Event, state: State) -> Result<OrchestratorOutcome, OrchError> {
        let target = state
            .route()
            .map(str::to_string)
            .or_else(|| event.target().map(str::to_string))
            .or_else(|| self.default_error_handler.clone())
            .ok_or_else(|| {
                OrchError::NoRoute("no route metadata, event target, or default handler configured".into())
            })?;

        let agent = self
            .agents
            .get(&target)
            .cloned()
            .ok_or_else(|| OrchError::AgentNotFound(target.clone()))?;

        match invoke_agent(&target, &agent, event, &state, &self.callbacks, self.trace.as_ref()).await {
            Ok(result) => {
                let output = result.output;
                match output.route() {
                    Some(next) if next != target && next != ROUTE_TERMINATOR => {
                        let followup = Event::followup(next.to_string(), &output);
                        Ok(OrchestratorOutcome::with_followup(output, followup))
                    }
                    _ => Ok(OrchestratorOutcome::terminal(output)),
                }
            }
            Err(err) => {
                let kind = err.kind();
                if kind == ErrorKind::Critical {
                    return Ok(OrchestratorOutcome::terminal(state));
                }
                if let Some(handler_name) = self.error_routing.get(&kind) {
                    let mut error_state = state.clone();
                    error_state.set("error_kind", serde_json::json!(format!("{kind:?}")));
                    error_state.set("error_message", serde_json::json!(err.to_string()));
                    let followup = Event::followup(handler_name.clone(), &error_state);
                    Ok(OrchestratorOutcome::with_followup(error_state, followup))
                } else {
                    Ok(OrchestratorOutcome::terminal(state))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkit_callback::CallbackRegistry;
    use agentkit_core::{AgentError, AgentResult};
    use agentkit_trace::InMemoryTraceLogger;
    use async_trait::async_trait as at;
    use std::time::SystemTime;

    struct Echo;
    #[at]
    impl AgentHandler for Echo {
        async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
            let now = SystemTime::now();
            Ok(AgentResult::success(state.clone(), now, now))
        }
    }

    struct SetsRoute(&'static str);
    #[at]
    impl AgentHandler for SetsRoute {
        async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
            let mut out = state.clone();
            out.set_route(self.0);
            let now = SystemTime::now();
            Ok(AgentResult::success(out, now, now))
        }
    }

    struct AlwaysFails;
    #[at]
    impl AgentHandler for AlwaysFails {
        async fn run(&self, _event: &Event, _state: &State) -> Result<AgentResult, AgentError> {
            Err(AgentError::Transient("down".into()))
        }
    }

    fn orch() -> RouteOrchestrator {
        RouteOrchestrator::new(Arc::new(CallbackRegistry::new()), Arc::new(InMemoryTraceLogger::new()))
    }

    #[tokio::test]
    async fn routes_to_event_target_when_no_metadata_route() {
        let mut o = orch();
        o.register("agent-a", Arc::new(Echo));
        let event = Event::new("agent-a", Default::default());
        let state = event.into_state();
        let outcome = o.dispatch(&event, state).await.unwrap();
        assert!(outcome.followup.is_none());
    }

    #[tokio::test]
    async fn terminates_when_output_route_is_terminator() {
        let mut o = orch();
        o.register("agent-a", Arc::new(SetsRoute(ROUTE_TERMINATOR)));
        let event = Event::new("agent-a", Default::default());
        let state = event.into_state();
        let outcome = o.dispatch(&event, state).await.unwrap();
        assert!(outcome.followup.is_none());
    }

    #[tokio::test]
    async fn re_dispatches_when_output_route_differs() {
        let mut o = orch();
        o.register("agent-a", Arc::new(SetsRoute("agent-b")));
        let event = Event::new("agent-a", Default::default());
        let state = event.into_state();
        let outcome = o.dispatch(&event, state).await.unwrap();
        let followup = outcome.followup.unwrap();
        assert_eq!(followup.target(), Some("agent-b"));
    }

    #[tokio::test]
    async fn missing_route_and_target_fails_with_no_route() {
        let o = orch();
        let event = Event::untargeted(Default::default());
        let state = event.into_state();
        let err = o.dispatch(&event, state).await.unwrap_err();
        matches!(err, OrchError::NoRoute(_));
    }

    #[tokio::test]
    async fn unknown_agent_fails_with_agent_not_found() {
        let o = orch();
        let event = Event::new("ghost", Default::default());
        let state = event.into_state();
        let err = o.dispatch(&event, state).await.unwrap_err();
        assert!(matches!(err, OrchError::AgentNotFound(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn mapped_error_kind_re_dispatches_to_error_handler() {
        let mut o = orch();
        o.register("agent-a", Arc::new(AlwaysFails));
        o.register("handler", Arc::new(Echo));
        o.route_error(ErrorKind::Transient, "handler");
        let event = Event::new("agent-a", Default::default());
        let state = event.into_state();
        let outcome = o.dispatch(&event, state).await.unwrap();
        let followup = outcome.followup.unwrap();
        assert_eq!(followup.target(), Some("handler"));
        assert_eq!(outcome.state.get("error_kind"), Some(&serde_json::json!("Transient")));
    }

    #[tokio::test]
    async fn unmapped_error_kind_terminates() {
        let mut o = orch();
        o.register("agent-a", Arc::new(AlwaysFails));
        let event = Event::new("agent-a", Default::default());
        let state = event.into_state();
        let outcome = o.dispatch(&event, state).await.unwrap();
        assert!(outcome.followup.is_none());
    }
}
