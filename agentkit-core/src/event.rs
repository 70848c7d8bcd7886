//! Event — the immutable record created at system edges and handed to
//! the [`crate::orchestrator::Orchestrator`] by the Runner.

use crate::id::{new_event_id, EventId};
use crate::state::{State, META_SESSION_ID};
use std::collections::HashMap;
use std::time::SystemTime;

/// An immutable unit of work delivered to the system.
///
/// Created by a caller (or by a re-routing orchestrator forming a
/// follow-up event), validated on intake by the Runner (missing
/// `session_id` is filled in at that point), enqueued, dequeued by the
/// dispatch loop, and consumed by an orchestrator.
#[derive(Debug, Clone)]
pub struct Event {
    id: EventId,
    target: Option<String>,
    data: HashMap<String, serde_json::Value>,
    metadata: HashMap<String, String>,
    created_at: SystemTime,
}

impl Event {
    /// Create a new event targeting `target` (the initial routing hint)
    /// with the given data payload. A fresh [`EventId`] is assigned and
    /// the creation timestamp is stamped now.
    pub fn new(target: impl Into<String>, data: HashMap<String, serde_json::Value>) -> Self {
        Self {
            id: new_event_id(),
            target: Some(target.into()),
            data,
            metadata: HashMap::new(),
            created_at: SystemTime::now(),
        }
    }

    /// Create a new event with no initial target — routing must come
    /// from metadata or it fails with `NoRoute` at the orchestrator.
    pub fn untargeted(data: HashMap<String, serde_json::Value>) -> Self {
        Self {
            id: new_event_id(),
            target: None,
            data,
            metadata: HashMap::new(),
            created_at: SystemTime::now(),
        }
    }

    /// This event's unique id.
    pub fn id(&self) -> &EventId {
        &self.id
    }

    /// The initial routing hint, if any.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Borrow the data payload.
    pub fn data(&self) -> &HashMap<String, serde_json::Value> {
        &self.data
    }

    /// Borrow the metadata.
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Mutably borrow the metadata — used by the Runner on intake to fill
    /// in a missing `session_id`.
    pub fn metadata_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.metadata
    }

    /// Set a metadata value.
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// This event's `session_id`, if set.
    pub fn session_id(&self) -> Option<&str> {
        self.metadata.get(META_SESSION_ID).map(String::as_str)
    }

    /// When this event was created.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Derive the initial [`State`] an orchestrator should use for this
    /// event: data and metadata copied verbatim.
    pub fn into_state(&self) -> State {
        let mut state = State::new();
        for (k, v) in &self.data {
            state.set(k.clone(), v.clone());
        }
        for (k, v) in &self.metadata {
            state.set_meta(k.clone(), v.clone());
        }
        state
    }

    /// Build a follow-up event for re-dispatch: same session id, a fresh
    /// event id, data/metadata copied from the given state. Used by the
    /// route orchestrator when an agent's output state names a non-empty,
    /// different `route`.
    pub fn followup(target: impl Into<String>, state: &State) -> Self {
        let mut event = Event::new(target, state.data().clone());
        for (k, v) in state.metadata() {
            event.set_meta(k.clone(), v.clone());
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Event::untargeted(HashMap::new());
        let b = Event::untargeted(HashMap::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn into_state_copies_data_and_metadata() {
        let mut data = HashMap::new();
        data.insert("msg".to_string(), serde_json::json!("hi"));
        let mut event = Event::new("agent-a", data);
        event.set_meta("session_id", "s1");

        let state = event.into_state();
        assert_eq!(state.get("msg"), Some(&serde_json::json!("hi")));
        assert_eq!(state.session_id(), Some("s1"));
    }
}
