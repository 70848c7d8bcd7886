//! End-to-end Runner tests wired against the real orchestrators, not
//! test doubles, covering §8's testable properties and a chain-forming
//! scenario (S1/S2-style).

use agentkit_callback::CallbackRegistry;
use agentkit_core::{AgentError, AgentHandler, AgentResult, Event, HookPoint, State};
use agentkit_orch::RouteOrchestrator;
use agentkit_runtime::{Runner, RunnerError};
use agentkit_trace::InMemoryTraceLogger;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

struct SetsRoute(&'static str);

#[async_trait]
impl AgentHandler for SetsRoute {
    async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
        let mut out = state.clone();
        out.set_route(self.0);
        let now = SystemTime::now();
        Ok(AgentResult::success(out, now, now))
    }
}

struct Terminal;

#[async_trait]
impl AgentHandler for Terminal {
    async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
        let mut out = state.clone();
        out.clear_route();
        out.set("handled_by", serde_json::json!("terminal"));
        let now = SystemTime::now();
        Ok(AgentResult::success(out, now, now))
    }
}

#[tokio::test]
async fn a_two_hop_chain_re_enters_the_queue_and_terminates() {
    let callbacks = Arc::new(CallbackRegistry::new());
    let trace = Arc::new(InMemoryTraceLogger::new());
    let mut route = RouteOrchestrator::new(callbacks.clone(), trace.clone());
    route.register("first", Arc::new(SetsRoute("second")));
    route.register("second", Arc::new(Terminal));

    let runner = Runner::builder(Arc::new(route))
        .callbacks(callbacks)
        .trace(trace)
        .build();
    runner.start().unwrap();

    let mut event = Event::new("first", Default::default());
    event.set_meta("session_id", "s-chain");
    runner.emit(event).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    let entries = runner.dump_trace(&agentkit_core::SessionId::new("s-chain")).await;
    // Before/After for the original event, Before/After for the follow-up,
    // plus Before/After-AgentRun pairs the orchestrator itself fires.
    let event_level = entries
        .iter()
        .filter(|e| matches!(e.hook, HookPoint::BeforeEventHandling | HookPoint::AfterEventHandling))
        .count();
    assert_eq!(event_level, 4);

    let agent_level = entries
        .iter()
        .filter(|e| matches!(e.hook, HookPoint::BeforeAgentRun | HookPoint::AfterAgentRun))
        .count();
    assert_eq!(agent_level, 4);

    runner.stop(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn emit_before_start_is_rejected() {
    let callbacks = Arc::new(CallbackRegistry::new());
    let trace = Arc::new(InMemoryTraceLogger::new());
    let route = RouteOrchestrator::new(callbacks, trace);
    let runner = Runner::builder(Arc::new(route)).build();

    let event = Event::new("first", Default::default());
    assert_eq!(runner.emit(event).await.unwrap_err(), RunnerError::NotStarted);
}

#[tokio::test]
async fn queue_full_backpressure_is_synchronous() {
    let callbacks = Arc::new(CallbackRegistry::new());
    let trace = Arc::new(InMemoryTraceLogger::new());
    let mut route = RouteOrchestrator::new(callbacks.clone(), trace.clone());
    // A slow agent keeps the single dispatch worker busy long enough for
    // a second `emit` to observe a full queue of depth 1.
    struct Slow;
    #[async_trait]
    impl AgentHandler for Slow {
        async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let now = SystemTime::now();
            Ok(AgentResult::success(state.clone(), now, now))
        }
    }
    route.register("slow", Arc::new(Slow));

    let runner = Runner::builder(Arc::new(route))
        .callbacks(callbacks)
        .trace(trace)
        .queue_size(1)
        .build();
    runner.start().unwrap();

    let mut first = Event::new("slow", Default::default());
    first.set_meta("session_id", "s1");
    runner.emit(first).await.unwrap();

    // Give the worker a moment to dequeue the first event so the queue is
    // empty again, then fill it with a second event while the worker is
    // still busy inside `Slow::run`, then attempt a third.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let mut second = Event::new("slow", Default::default());
    second.set_meta("session_id", "s1");
    runner.emit(second).await.unwrap();

    let mut third = Event::new("slow", Default::default());
    third.set_meta("session_id", "s1");
    assert_eq!(runner.emit(third).await.unwrap_err(), RunnerError::QueueFull);

    runner.stop(Duration::from_millis(500)).await;
}
