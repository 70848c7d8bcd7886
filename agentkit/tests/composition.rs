//! End-to-end tests exercising the facade crate: config loading, a
//! resilience-wrapped agent inside a sequential chain, callbacks, and
//! trace retrieval through the `Runner`.

use agentkit::prelude::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

struct FlakyThenFine(Arc<AtomicUsize>);

#[async_trait]
impl AgentHandler for FlakyThenFine {
    async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
        let attempt = self.0.fetch_add(1, Ordering::SeqCst);
        let now = SystemTime::now();
        if attempt == 0 {
            return Err(AgentError::Transient("not yet".into()));
        }
        let mut out = state.clone();
        out.set("draft", serde_json::json!("hello"));
        Ok(AgentResult::success(out, now, now))
    }
}

struct Uppercase;

#[async_trait]
impl AgentHandler for Uppercase {
    async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
        let mut out = state.clone();
        let draft = out.get("draft").and_then(|v| v.as_str()).unwrap_or_default();
        out.set("final", serde_json::json!(draft.to_uppercase()));
        let now = SystemTime::now();
        Ok(AgentResult::success(out, now, now))
    }
}

struct CountsAgentRuns(Arc<AtomicUsize>);

#[async_trait]
impl Callback for CountsAgentRuns {
    async fn on_event(
        &self,
        _ctx: &HookContext<'_>,
        state: State,
    ) -> Result<State, CallbackError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(state)
    }
}

#[tokio::test]
async fn config_drives_a_resilient_sequential_chain_through_the_runner() {
    let toml = r#"
        [retry.default]
        max_attempts = 3
        base_delay_ms = 1
        max_delay_ms = 5
    "#;
    let config = Config::from_toml_str(toml).expect("valid config");
    let retry_cfg = config.retry.0.get("default").cloned().unwrap_or_default();

    let attempts = Arc::new(AtomicUsize::new(0));
    let flaky: Arc<dyn AgentHandler> = Arc::new(Retry::new(
        Arc::new(FlakyThenFine(attempts.clone())),
        retry_cfg.to_retry_config(),
    ));

    let callbacks = Arc::new(CallbackRegistry::new());
    let agent_runs = Arc::new(AtomicUsize::new(0));
    callbacks
        .register(
            HookPoint::AfterAgentRun,
            "counter",
            Arc::new(CountsAgentRuns(agent_runs.clone())),
        )
        .await;

    let trace = Arc::new(InMemoryTraceLogger::new());
    let chain = SequentialOrchestrator::new(
        vec![
            ("draft".to_string(), flaky),
            ("upper".to_string(), Arc::new(Uppercase)),
        ],
        false,
        callbacks.clone(),
        trace.clone(),
    );

    let runner = Runner::builder(Arc::new(chain))
        .callbacks(callbacks)
        .trace(trace)
        .build();
    runner.start().unwrap();

    let mut event = Event::new("draft", Default::default());
    event.set_meta("session_id", "s-composition");
    runner.emit(event).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    runner.stop(Duration::from_millis(200)).await;

    assert_eq!(agent_runs.load(Ordering::SeqCst), 2);

    let entries = runner
        .dump_trace(&SessionId::new("s-composition"))
        .await;
    let after_event = entries
        .iter()
        .find(|e| matches!(e.hook, HookPoint::AfterEventHandling))
        .expect("an AfterEventHandling entry");
    assert!(after_event.error.is_none());
}

#[tokio::test]
async fn merged_config_overrides_only_the_named_target() {
    let base = Config::default();
    let override_toml = r#"
        [circuit_breaker.llm]
        failure_threshold = 2
    "#;
    let overrides = Config::from_toml_str(override_toml).unwrap();
    let merged = base.merge(overrides);

    let llm = merged.circuit_breaker.0.get("llm").unwrap();
    assert_eq!(llm.failure_threshold, 2);
}
