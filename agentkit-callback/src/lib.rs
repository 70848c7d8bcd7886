#![deny(missing_docs)]
//! Callback registry and dispatch for the AgenticGoKit runtime.
//!
//! [`CallbackRegistry`] collects named [`Callback`] subscribers per
//! [`HookPoint`] and dispatches them in registration order, threading a
//! possibly-modified [`State`] through the chain. Unlike a middleware
//! pipeline, every subscriber always runs: there is no `Halt`-style
//! action here, since pipeline termination is an orchestrator routing
//! concern, not a callback concern.

use agentkit_core::{Callback, CallbackError, HookContext, HookPoint, State};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A registry that dispatches hook events to named subscribers in
/// registration order.
///
/// Subscribers are keyed by `(HookPoint, name)` so a caller can replace or
/// remove a specific subscriber without clearing the whole point.
pub struct CallbackRegistry {
    subscribers: RwLock<HashMap<HookPoint, Vec<(String, Arc<dyn Callback>)>>>,
}

impl CallbackRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a subscriber at `point` under `name`. A second
    /// registration with the same `(point, name)` replaces the first
    /// rather than appending a duplicate.
    pub async fn register(&self, point: HookPoint, name: impl Into<String>, callback: Arc<dyn Callback>) {
        let name = name.into();
        let mut subscribers = self.subscribers.write().await;
        let entries = subscribers.entry(point).or_default();
        if let Some(existing) = entries.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = callback;
        } else {
            entries.push((name, callback));
        }
    }

    /// Remove the subscriber registered at `point` under `name`, if any.
    pub async fn unregister(&self, point: HookPoint, name: &str) {
        let mut subscribers = self.subscribers.write().await;
        if let Some(entries) = subscribers.get_mut(&point) {
            entries.retain(|(n, _)| n != name);
        }
    }

    /// Dispatch `point` to every registered subscriber in registration
    /// order, threading the state through the chain. A subscriber error
    /// is logged and swallowed — dispatch continues with the last state
    /// that successfully ran.
    pub async fn dispatch(&self, ctx: &HookContext<'_>, mut state: State) -> State {
        let subscribers = self.subscribers.read().await;
        let Some(entries) = subscribers.get(&ctx.point) else {
            return state;
        };
        for (name, callback) in entries {
            match callback.on_event(ctx, state.clone()).await {
                Ok(next) => state = next,
                Err(CallbackError::Failed(msg)) => {
                    tracing::warn!(
                        hook = ?ctx.point,
                        subscriber = %name,
                        session_id = %ctx.session_id,
                        event_id = %ctx.event_id,
                        error = %msg,
                        "callback subscriber failed; continuing with prior state"
                    );
                }
            }
        }
        state
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}
