//! `CircuitBreaker` — a three-state (`Closed`/`Open`/`HalfOpen`) breaker
//! around an inner handler, with an optional concurrency gate.
//!
//! The state machine is a lock-free atomic counter set, grounded directly
//! on the `ediblackk-mylm` `CircuitBreaker` shape: an `AtomicU32` for
//! state, `AtomicU32`s for consecutive failures/successes, and a
//! `Mutex<Option<Instant>>` for the open-since timestamp (the only part
//! that needs a lock, since it's read-modify-write across two fields).

use crate::error::ResilienceError;
use agentkit_core::{AgentError, AgentHandler, AgentResult, Event, State};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;

/// The breaker's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through normally.
    Closed,
    /// Calls are rejected until `reset_timeout` has elapsed since the
    /// last failure.
    Open,
    /// A trial period: a limited number of calls are allowed through to
    /// test whether the inner handler has recovered.
    HalfOpen,
}

impl CircuitState {
    fn to_u32(self) -> u32 {
        match self {
            CircuitState::Closed => 0,
            CircuitState::Open => 1,
            CircuitState::HalfOpen => 2,
        }
    }

    fn from_u32(v: u32) -> Self {
        match v {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

/// Circuit-breaker policy.
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures (while closed) before the circuit opens.
    pub failure_threshold: u32,
    /// Consecutive successes (while half-open) before the circuit closes.
    pub success_threshold: u32,
    /// How long the circuit stays open before allowing a half-open trial.
    pub reset_timeout: std::time::Duration,
    /// Concurrent in-flight calls allowed while closed or half-open. `None`
    /// means unbounded.
    pub max_concurrent_calls: Option<usize>,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout: std::time::Duration::from_secs(30),
            max_concurrent_calls: None,
        }
    }
}

struct BreakerState {
    state: AtomicU32,
    failures: AtomicU32,
    successes: AtomicU32,
    opened_at: Mutex<Option<Instant>>,
    /// Gates half-open to exactly one in-flight trial call, independent
    /// of the separate `max_concurrent_calls` semaphore. Claimed by
    /// `compare_exchange` when a call is admitted while half-open (or
    /// when a call is the one that flips Open → HalfOpen), released once
    /// that call's outcome is recorded.
    half_open_trial: AtomicBool,
}

impl BreakerState {
    fn new() -> Self {
        Self {
            state: AtomicU32::new(CircuitState::Closed.to_u32()),
            failures: AtomicU32::new(0),
            successes: AtomicU32::new(0),
            opened_at: Mutex::new(None),
            half_open_trial: AtomicBool::new(false),
        }
    }

    fn get(&self) -> CircuitState {
        CircuitState::from_u32(self.state.load(Ordering::Relaxed))
    }

    fn set(&self, s: CircuitState) {
        self.state.store(s.to_u32(), Ordering::Relaxed);
    }

    /// Atomically move from `from` to `to`; `true` only for the single
    /// caller that wins the race.
    fn try_transition(&self, from: CircuitState, to: CircuitState) -> bool {
        self.state
            .compare_exchange(from.to_u32(), to.to_u32(), Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    /// Claim the single half-open trial slot; `true` only for the one
    /// caller that wins it.
    fn claim_half_open_trial(&self) -> bool {
        self.half_open_trial
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    fn release_half_open_trial(&self) {
        self.half_open_trial.store(false, Ordering::Release);
    }
}

/// Wraps an inner handler with a three-state circuit breaker and an
/// optional concurrency gate.
pub struct CircuitBreaker {
    inner: Arc<dyn AgentHandler>,
    config: CircuitBreakerConfig,
    state: BreakerState,
    permits: Option<Semaphore>,
}

impl CircuitBreaker {
    /// Wrap `inner` with the given policy.
    pub fn new(inner: Arc<dyn AgentHandler>, config: CircuitBreakerConfig) -> Self {
        let permits = config.max_concurrent_calls.map(Semaphore::new);
        Self {
            inner,
            config,
            state: BreakerState::new(),
            permits,
        }
    }

    /// Current breaker state, for inspection/tests.
    pub fn state(&self) -> CircuitState {
        self.state.get()
    }

    /// `true` if this call may proceed to the inner handler. For
    /// `HalfOpen` (including the instant a call flips `Open` →
    /// `HalfOpen`), only the single caller that claims
    /// `half_open_trial` is admitted — "one trial call is allowed"
    /// (spec §4.5) holds even when many callers arrive at once.
    fn allow_request(&self) -> bool {
        match self.state.get() {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => self.state.claim_half_open_trial(),
            CircuitState::Open => {
                let opened_at = self.state.opened_at.lock().expect("lock poisoned");
                let eligible = matches!(*opened_at, Some(t) if t.elapsed() >= self.config.reset_timeout);
                drop(opened_at);
                if !eligible {
                    return false;
                }
                // Only the caller that wins the CAS actually flips the
                // state; everyone else still observes `Open` (or, once
                // the winner has flipped it, `HalfOpen` with the trial
                // already claimed) and is rejected.
                if self.state.try_transition(CircuitState::Open, CircuitState::HalfOpen) {
                    self.state.successes.store(0, Ordering::Relaxed);
                    self.state.claim_half_open_trial();
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_success(&self) {
        self.state.failures.store(0, Ordering::Relaxed);
        if self.state.get() == CircuitState::HalfOpen {
            let successes = self.state.successes.fetch_add(1, Ordering::Relaxed) + 1;
            if successes >= self.config.success_threshold {
                self.state.set(CircuitState::Closed);
                self.state.successes.store(0, Ordering::Relaxed);
            }
            self.state.release_half_open_trial();
        }
    }

    fn record_failure(&self) {
        self.state.successes.store(0, Ordering::Relaxed);
        *self.state.opened_at.lock().expect("lock poisoned") = Some(Instant::now());

        if self.state.get() == CircuitState::HalfOpen {
            self.state.set(CircuitState::Open);
            self.state.release_half_open_trial();
            return;
        }
        let failures = self.state.failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.config.failure_threshold {
            self.state.set(CircuitState::Open);
        }
    }
}

#[async_trait]
impl AgentHandler for CircuitBreaker {
    async fn run(&self, event: &Event, state: &State) -> Result<AgentResult, AgentError> {
        if !self.allow_request() {
            return Err(ResilienceError::CircuitOpen.into_agent_error());
        }

        let _permit = match &self.permits {
            Some(sem) => match sem.try_acquire() {
                Ok(p) => Some(p),
                Err(_) => return Err(ResilienceError::CircuitBusy.into_agent_error()),
            },
            None => None,
        };

        match self.inner.run(event, state).await {
            Ok(result) => {
                self.record_success();
                Ok(result)
            }
            Err(err) => {
                self.record_failure();
                Err(err)
            }
        }
    }
}
