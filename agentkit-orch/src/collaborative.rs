//! `CollaborativeOrchestrator` — fan-out to many agents concurrently,
//! merge their outputs, and terminate (no re-dispatch).

use crate::support::invoke_agent;
use agentkit_callback::CallbackRegistry;
use agentkit_core::{AgentError, AgentHandler, Event, OrchError, Orchestrator, OrchestratorOutcome, State};
use agentkit_trace::TraceLogger;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// How many agent successes are required for the trajectory to be
/// considered non-failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Every agent must succeed for the trajectory not to be marked
    /// failed — but a failure still merges in as an `errors` entry
    /// rather than aborting the others.
    All,
    /// A single success is sufficient.
    Any,
    /// At least `n` agents must succeed.
    Threshold(usize),
}

/// Fans an event out to every registered agent (or a caller-provided
/// subset) concurrently, merges their output states, and terminates —
/// collaborative trajectories never auto-redispatch.
pub struct CollaborativeOrchestrator {
    agents: Vec<(String, Arc<dyn AgentHandler>)>,
    failure_policy: FailurePolicy,
    max_concurrency: Option<usize>,
    callbacks: Arc<CallbackRegistry>,
    trace: Arc<dyn TraceLogger>,
}

impl CollaborativeOrchestrator {
    /// Create an orchestrator over `agents` (name, handler pairs),
    /// invoked in the given order for merge determinism, though they
    /// run concurrently.
    pub fn new(
        agents: Vec<(String, Arc<dyn AgentHandler>)>,
        failure_policy: FailurePolicy,
        max_concurrency: Option<usize>,
        callbacks: Arc<CallbackRegistry>,
        trace: Arc<dyn TraceLogger>,
    ) -> Self {
        Self {
            agents,
            failure_policy,
            max_concurrency,
            callbacks,
            trace,
        }
    }
}

#[async_trait]
impl Orchestrator for CollaborativeOrchestrator {
    async fn dispatch(&self, event: &Event, state: State) -> Result<OrchestratorOutcome, OrchError> {
        if self.agents.is_empty() {
            return Ok(OrchestratorOutcome::terminal(state));
        }

        let semaphore = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n.max(1))));
        let mut set: JoinSet<(String, Result<agentkit_core::AgentResult, AgentError>)> = JoinSet::new();

        for (name, agent) in &self.agents {
            let name = name.clone();
            let agent = Arc::clone(agent);
            let event = event.clone();
            let state = state.clone();
            let callbacks = Arc::clone(&self.callbacks);
            let trace = Arc::clone(&self.trace);
            let semaphore = semaphore.clone();

            set.spawn(async move {
                let _permit = match &semaphore {
                    Some(sem) => Some(sem.acquire_owned().await.expect("semaphore not closed")),
                    None => None,
                };
                let result = invoke_agent(&name, &agent, &event, &state, callbacks.as_ref(), trace.as_ref()).await;
                (name, result)
            });
        }

        let mut outcomes: Vec<(String, Result<State, AgentError>)> = Vec::with_capacity(self.agents.len());
        // §4.2.2/§5: under `Any`, one success is sufficient and the
        // remaining in-flight agents are cancelled rather than awaited —
        // stop pulling from the JoinSet the moment a success lands and
        // abort whatever is still running.
        let cancel_on_first_success = matches!(self.failure_policy, FailurePolicy::Any);
        while let Some(joined) = set.join_next().await {
            let done = match joined {
                Ok((name, Ok(result))) => {
                    let succeeded = true;
                    outcomes.push((name, Ok(result.output)));
                    succeeded
                }
                Ok((name, Err(err))) => {
                    outcomes.push((name, Err(err)));
                    false
                }
                Err(join_err) => {
                    outcomes.push(("<panicked>".into(), Err(AgentError::Critical(join_err.to_string()))));
                    false
                }
            };
            if done && cancel_on_first_success {
                set.abort_all();
                break;
            }
        }

        let successes = outcomes.iter().filter(|(_, r)| r.is_ok()).count();
        let policy_met = match self.failure_policy {
            // §4.2.2: under `all`, a failing agent aggregates into
            // `errors` but never fails the trajectory.
            FailurePolicy::All => true,
            FailurePolicy::Any => successes >= 1,
            FailurePolicy::Threshold(n) => successes >= n,
        };

        let merged = merge_collaborative(&state, outcomes);

        if policy_met {
            Ok(OrchestratorOutcome::terminal(merged))
        } else {
            Err(OrchError::Other("collaborative failure policy not met".into()))
        }
    }
}

/// Merge discipline (§4.2.2): reserved keys (`route`, `session_id`) are
/// taken from the input state — collaborative never auto-routes. A data
/// key produced by more than one agent is collected into a
/// `<key>__by_agent` object keyed by agent name rather than silently
/// overwritten. Metadata collisions keep the earliest contributor by
/// agent name order. Failures contribute an entry under `errors`.
fn merge_collaborative(input: &State, outcomes: Vec<(String, Result<State, AgentError>)>) -> State {
    let mut merged = State::new();
    if let Some(route) = input.get_meta(agentkit_core::state::META_ROUTE) {
        merged.set_meta(agentkit_core::state::META_ROUTE, route);
    }
    if let Some(session_id) = input.get_meta(agentkit_core::state::META_SESSION_ID) {
        merged.set_meta(agentkit_core::state::META_SESSION_ID, session_id);
    }

    let mut data_contributors: HashMap<String, Vec<(String, serde_json::Value)>> = HashMap::new();
    let mut metadata_contributors: HashMap<String, Vec<(String, String)>> = HashMap::new();
    let mut errors = Vec::new();

    let mut ordered = outcomes;
    ordered.sort_by(|a, b| a.0.cmp(&b.0));

    for (agent_name, result) in ordered {
        match result {
            Ok(output) => {
                for (k, v) in output.data() {
                    if k == "errors" {
                        continue;
                    }
                    data_contributors.entry(k.clone()).or_default().push((agent_name.clone(), v.clone()));
                }
                for (k, v) in output.metadata() {
                    if k == agentkit_core::state::META_ROUTE || k == agentkit_core::state::META_SESSION_ID {
                        continue;
                    }
                    metadata_contributors.entry(k.clone()).or_default().push((agent_name.clone(), v.clone()));
                }
            }
            Err(err) => {
                errors.push(serde_json::json!({"agent": agent_name, "error": err.to_string()}));
            }
        }
    }

    for (key, mut contributors) in data_contributors {
        if contributors.len() == 1 {
            merged.set(key, contributors.pop().unwrap().1);
        } else {
            let by_agent: serde_json::Map<String, serde_json::Value> = contributors.into_iter().collect();
            merged.set(key, serde_json::Value::Object(by_agent));
        }
    }
    for (key, contributors) in metadata_contributors {
        // earliest contributor wins — `contributors` is already in sorted
        // agent-name order, the deterministic ordering the spec calls for.
        if let Some((_, value)) = contributors.into_iter().next() {
            merged.set_meta(key, value);
        }
    }
    if !errors.is_empty() {
        merged.set("errors", serde_json::Value::Array(errors));
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkit_core::AgentResult;
    use agentkit_trace::InMemoryTraceLogger;
    use async_trait::async_trait as at;
    use std::time::SystemTime;

    struct SetsKey(&'static str, serde_json::Value);
    #[at]
    impl AgentHandler for SetsKey {
        async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
            let mut out = state.clone();
            out.set(self.0, self.1.clone());
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

    fn support() -> (Arc<CallbackRegistry>, Arc<InMemoryTraceLogger>) {
        (Arc::new(CallbackRegistry::new()), Arc::new(InMemoryTraceLogger::new()))
    }

    #[tokio::test]
    async fn zero_agents_terminates_with_input_state() {
        let (cb, tr) = support();
        let o = CollaborativeOrchestrator::new(vec![], FailurePolicy::All, None, cb, tr);
        let event = Event::untargeted(Default::default());
        let state = event.into_state();
        let outcome = o.dispatch(&event, state.clone()).await.unwrap();
        assert_eq!(outcome.state, state);
    }

    #[tokio::test]
    async fn distinct_keys_merge_without_collision() {
        let (cb, tr) = support();
        let agents: Vec<(String, Arc<dyn AgentHandler>)> = vec![
            ("a".into(), Arc::new(SetsKey("from_a", serde_json::json!(1)))),
            ("b".into(), Arc::new(SetsKey("from_b", serde_json::json!(2)))),
        ];
        let o = CollaborativeOrchestrator::new(agents, FailurePolicy::All, None, cb, tr);
        let event = Event::untargeted(Default::default());
        let state = event.into_state();
        let outcome = o.dispatch(&event, state).await.unwrap();
        assert_eq!(outcome.state.get("from_a"), Some(&serde_json::json!(1)));
        assert_eq!(outcome.state.get("from_b"), Some(&serde_json::json!(2)));
    }

    #[tokio::test]
    async fn colliding_keys_are_indexed_by_agent() {
        let (cb, tr) = support();
        let agents: Vec<(String, Arc<dyn AgentHandler>)> = vec![
            ("a".into(), Arc::new(SetsKey("shared", serde_json::json!("from-a")))),
            ("b".into(), Arc::new(SetsKey("shared", serde_json::json!("from-b")))),
        ];
        let o = CollaborativeOrchestrator::new(agents, FailurePolicy::All, None, cb, tr);
        let event = Event::untargeted(Default::default());
        let state = event.into_state();
        let outcome = o.dispatch(&event, state).await.unwrap();
        let shared = outcome.state.get("shared").unwrap();
        assert_eq!(shared.get("a"), Some(&serde_json::json!("from-a")));
        assert_eq!(shared.get("b"), Some(&serde_json::json!("from-b")));
    }

    #[tokio::test]
    async fn all_policy_surfaces_failure_but_does_not_error() {
        let (cb, tr) = support();
        let agents: Vec<(String, Arc<dyn AgentHandler>)> = vec![
            ("a".into(), Arc::new(SetsKey("ok", serde_json::json!(true)))),
            ("b".into(), Arc::new(AlwaysFails)),
        ];
        let o = CollaborativeOrchestrator::new(agents, FailurePolicy::All, None, cb, tr);
        let event = Event::untargeted(Default::default());
        let state = event.into_state();
        let outcome = o.dispatch(&event, state).await.unwrap();
        assert_eq!(outcome.state.get("ok"), Some(&serde_json::json!(true)));
        let errors = outcome.state.get("errors").unwrap().as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["agent"], serde_json::json!("b"));
    }

    #[tokio::test]
    async fn threshold_policy_fails_when_not_enough_successes() {
        let (cb, tr) = support();
        let agents: Vec<(String, Arc<dyn AgentHandler>)> = vec![
            ("a".into(), Arc::new(AlwaysFails)),
            ("b".into(), Arc::new(AlwaysFails)),
        ];
        let o = CollaborativeOrchestrator::new(agents, FailurePolicy::Threshold(1), None, cb, tr);
        let event = Event::untargeted(Default::default());
        let state = event.into_state();
        let err = o.dispatch(&event, state).await.unwrap_err();
        assert!(matches!(err, OrchError::Other(_)));
    }

    #[tokio::test]
    async fn any_policy_succeeds_with_one_success() {
        let (cb, tr) = support();
        let agents: Vec<(String, Arc<dyn AgentHandler>)> = vec![
            ("a".into(), Arc::new(SetsKey("ok", serde_json::json!(true)))),
            ("b".into(), Arc::new(AlwaysFails)),
        ];
        let o = CollaborativeOrchestrator::new(agents, FailurePolicy::Any, None, cb, tr);
        let event = Event::untargeted(Default::default());
        let state = event.into_state();
        let outcome = o.dispatch(&event, state).await.unwrap();
        assert_eq!(outcome.state.get("ok"), Some(&serde_json::json!(true)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn any_policy_cancels_the_remainder_once_one_succeeds() {
        use std::sync::atomic::{AtomicBool, Ordering};

        struct Immediate;
        #[at]
        impl AgentHandler for Immediate {
            async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
                let now = SystemTime::now();
                Ok(AgentResult::success(state.clone(), now, now))
            }
        }

        struct NeverFinishes(Arc<AtomicBool>);
        #[at]
        impl AgentHandler for NeverFinishes {
            async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
                // Sleeps far longer than the test; if it is ever actually
                // awaited to completion instead of aborted, the test
                // times out instead of passing quickly.
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                self.0.store(true, Ordering::SeqCst);
                let now = SystemTime::now();
                Ok(AgentResult::success(state.clone(), now, now))
            }
        }

        let finished = Arc::new(AtomicBool::new(false));
        let (cb, tr) = support();
        let agents: Vec<(String, Arc<dyn AgentHandler>)> = vec![
            ("fast".into(), Arc::new(Immediate)),
            ("slow".into(), Arc::new(NeverFinishes(finished.clone()))),
        ];
        let o = CollaborativeOrchestrator::new(agents, FailurePolicy::Any, None, cb, tr);
        let event = Event::untargeted(Default::default());
        let state = event.into_state();

        let outcome = tokio::time::timeout(std::time::Duration::from_millis(500), o.dispatch(&event, state))
            .await
            .expect("dispatch should return as soon as one agent succeeds, not wait on the slow one")
            .unwrap();

        assert_eq!(outcome.state, State::new());
        assert!(!finished.load(Ordering::SeqCst), "the slow agent should have been aborted, not awaited");
    }
}
