//! `Timeout` — bounds an inner handler's wall-clock time.

use crate::error::ResilienceError;
use agentkit_core::{AgentError, AgentHandler, AgentResult, Event, State};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Wraps an inner handler with a hard wall-clock deadline.
///
/// On expiry the inner future is dropped (cooperative cancellation — the
/// wrapped agent must itself observe cancellation if it holds resources
/// that need explicit cleanup; this wrapper does not attempt to signal
/// it beyond dropping the future).
pub struct Timeout {
    inner: Arc<dyn AgentHandler>,
    duration: Duration,
}

impl Timeout {
    /// Wrap `inner` with a fixed deadline.
    pub fn new(inner: Arc<dyn AgentHandler>, duration: Duration) -> Self {
        Self { inner, duration }
    }
}

#[async_trait]
impl AgentHandler for Timeout {
    async fn run(&self, event: &Event, state: &State) -> Result<AgentResult, AgentError> {
        match tokio::time::timeout(self.duration, self.inner.run(event, state)).await {
            Ok(result) => result,
            Err(_) => Err(ResilienceError::Timeout(self.duration.as_millis() as u64).into_agent_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait as at;
    use std::time::SystemTime;

    struct Slow(Duration);

    #[at]
    impl AgentHandler for Slow {
        async fn run(&self, _event: &Event, state: &State) -> Result<AgentResult, AgentError> {
            tokio::time::sleep(self.0).await;
            let now = SystemTime::now();
            Ok(AgentResult::success(state.clone(), now, now))
        }
    }

    #[tokio::test]
    async fn fast_inner_completes_normally() {
        let wrapper = Timeout::new(Arc::new(Slow(Duration::from_millis(5))), Duration::from_millis(200));
        let event = Event::untargeted(Default::default());
        let out = wrapper.run(&event, &State::new()).await;
        assert!(out.is_ok());
    }

    #[tokio::test]
    async fn slow_inner_times_out() {
        let wrapper = Timeout::new(Arc::new(Slow(Duration::from_millis(200))), Duration::from_millis(10));
        let event = Event::untargeted(Default::default());
        let err = wrapper.run(&event, &State::new()).await.unwrap_err();
        assert_eq!(err.kind(), agentkit_core::ErrorKind::Timeout);
    }
}
