//! `AgentInspector` — an observable wrapper around an `AgentHandler`.
//!
//! Unlike `Timeout`/`Retry`/`CircuitBreaker`, this decorator never changes
//! the outcome of a call; it only counts and remembers it. Grounded on the
//! `call_count: AtomicUsize` mock-provider idiom used throughout the
//! teacher's test suites (`neuron-op-react`, `neuron-op-single-shot`,
//! `neuron-context`'s `tests/summarization.rs`), generalized from a
//! test-only fixture into a reusable decorator so the same counters are
//! available to ops surfaces, not just assertions.

use agentkit_core::{AgentError, AgentHandler, AgentResult, Event, State};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

/// Point-in-time counters read off an `AgentInspector`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectorStats {
    /// Total invocations observed, success or failure.
    pub calls: u64,
    /// Invocations whose inner handler returned `Ok`.
    pub successes: u64,
    /// Invocations whose inner handler returned `Err`.
    pub failures: u64,
    /// Duration in milliseconds of the most recently completed call, if
    /// any call has completed yet.
    pub last_duration_ms: Option<u64>,
}

/// Wraps an inner handler, counting calls and remembering the last result
/// without altering behavior. Composes like the other resilience
/// decorators (`AgentInspector::new(CircuitBreaker::new(...))`), and is
/// equally useful as a test fixture (assert `stats().calls`) or as a
/// lightweight ops surface (poll `stats()` without wiring a metrics
/// exporter, which is out of scope for this core).
pub struct AgentInspector {
    inner: Arc<dyn AgentHandler>,
    calls: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    last_result: RwLock<Option<AgentResult>>,
}

impl AgentInspector {
    /// Wrap `inner`, starting all counters at zero.
    pub fn new(inner: Arc<dyn AgentHandler>) -> Self {
        Self {
            inner,
            calls: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            last_result: RwLock::new(None),
        }
    }

    /// Snapshot the current counters.
    pub async fn stats(&self) -> InspectorStats {
        let last_duration_ms = self
            .last_result
            .read()
            .await
            .as_ref()
            .map(|r| r.duration.as_millis());
        InspectorStats {
            calls: self.calls.load(Ordering::SeqCst),
            successes: self.successes.load(Ordering::SeqCst),
            failures: self.failures.load(Ordering::SeqCst),
            last_duration_ms,
        }
    }

    /// The most recent `AgentResult` this inspector observed, if any call
    /// has completed.
    pub async fn last_result(&self) -> Option<AgentResult> {
        self.last_result.read().await.clone()
    }
}

#[async_trait]
impl AgentHandler for AgentInspector {
    async fn run(&self, event: &Event, state: &State) -> Result<AgentResult, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let started_at = SystemTime::now();
        let outcome = self.inner.run(event, state).await;
        match &outcome {
            Ok(result) => {
                self.successes.fetch_add(1, Ordering::SeqCst);
                *self.last_result.write().await = Some(result.clone());
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::SeqCst);
                let ended_at = SystemTime::now();
                let failed = AgentResult::failed(state.clone(), err.to_string(), started_at, ended_at);
                *self.last_result.write().await = Some(failed);
            }
        }
        outcome
    }
}
