//! State — the mutable-by-clone key/value carrier threaded between agents.
//!
//! A `State` holds two logically disjoint key spaces: opaque `data`
//! (`HashMap<String, serde_json::Value>`) and string-valued `metadata`
//! (`HashMap<String, String>`) used for routing and correlation. Agents
//! never mutate their input `State` in place — they clone it, build a new
//! one, or call [`State::merge`], all of which produce a fresh value.
//!
//! No dynamic reflection happens here: values are opaque JSON the core
//! never interprets. Schema validation belongs to the agent or to an
//! intake-validator callback, not to `State` itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved metadata key: the next-hop agent name. Empty or absent means
/// "terminate" (or, for the route orchestrator, "use the event's target").
pub const META_ROUTE: &str = "route";

/// Reserved metadata key: the session id correlating an event's full
/// trajectory across re-dispatches.
pub const META_SESSION_ID: &str = "session_id";

/// Reserved metadata value: the route terminator token.
pub const ROUTE_TERMINATOR: &str = "(end)";

/// The mutable-by-clone key/value carrier passed to and returned from
/// every [`crate::agent::AgentHandler`] invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    data: HashMap<String, serde_json::Value>,
    metadata: HashMap<String, String>,
}

/// How [`State::merge`] resolves a key that exists in both operands.
pub trait MergeResolver {
    /// Resolve a data-key collision. Receives the value from `self` and
    /// from `other`; returns the value the merged state should keep.
    fn resolve_data(
        &self,
        key: &str,
        mine: &serde_json::Value,
        theirs: &serde_json::Value,
    ) -> serde_json::Value;

    /// Resolve a metadata-key collision.
    fn resolve_metadata(&self, key: &str, mine: &str, theirs: &str) -> String;
}

/// Default merge policy: `other` wins on data collisions, `self` wins on
/// metadata collisions (so a caller merging an agent's output into the
/// current routing/session metadata doesn't silently lose its `route` or
/// `session_id`).
pub struct DefaultMergeResolver;

impl MergeResolver for DefaultMergeResolver {
    fn resolve_data(
        &self,
        _key: &str,
        _mine: &serde_json::Value,
        theirs: &serde_json::Value,
    ) -> serde_json::Value {
        theirs.clone()
    }

    fn resolve_metadata(&self, _key: &str, mine: &str, _theirs: &str) -> String {
        mine.to_string()
    }
}

impl State {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a data value by key.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Set a data value, overwriting any existing value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Remove a data value, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Iterate over all data keys.
    pub fn data_keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Borrow the full data map.
    pub fn data(&self) -> &HashMap<String, serde_json::Value> {
        &self.data
    }

    /// Read a metadata value by key.
    pub fn get_meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Set a metadata value, overwriting any existing value for the key.
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Remove a metadata value, returning it if present.
    pub fn remove_meta(&mut self, key: &str) -> Option<String> {
        self.metadata.remove(key)
    }

    /// Iterate over all metadata keys.
    pub fn metadata_keys(&self) -> impl Iterator<Item = &str> {
        self.metadata.keys().map(String::as_str)
    }

    /// Borrow the full metadata map.
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Typed accessor over the reserved `route` metadata key. `None` and
    /// `Some("")` both mean "no explicit next hop" to callers that treat
    /// absence and emptiness the same way; callers that care about the
    /// distinction should use [`State::get_meta`] directly.
    pub fn route(&self) -> Option<&str> {
        self.get_meta(META_ROUTE).filter(|r| !r.is_empty())
    }

    /// Set the `route` metadata key.
    pub fn set_route(&mut self, agent: impl Into<String>) {
        self.set_meta(META_ROUTE, agent.into());
    }

    /// Clear the `route` metadata key (terminate the trajectory).
    pub fn clear_route(&mut self) {
        self.set_meta(META_ROUTE, "");
    }

    /// True if the route is absent, empty, or the terminator token.
    pub fn is_route_terminal(&self) -> bool {
        match self.get_meta(META_ROUTE) {
            None => true,
            Some(r) => r.is_empty() || r == ROUTE_TERMINATOR,
        }
    }

    /// Typed accessor over the reserved `session_id` metadata key.
    pub fn session_id(&self) -> Option<&str> {
        self.get_meta(META_SESSION_ID)
    }

    /// Set the `session_id` metadata key.
    pub fn set_session_id(&mut self, session_id: impl Into<String>) {
        self.set_meta(META_SESSION_ID, session_id.into());
    }

    /// Merge two states with the default resolver ([`DefaultMergeResolver`]):
    /// `other` wins on data collisions, `self` wins on metadata collisions.
    /// Never mutates either input.
    pub fn merge(&self, other: &State) -> State {
        self.merge_with(other, &DefaultMergeResolver)
    }

    /// Merge two states with a caller-supplied [`MergeResolver`]. Never
    /// mutates either input. The merged key set is the union of both
    /// inputs' key sets, in both spaces.
    pub fn merge_with(&self, other: &State, resolver: &dyn MergeResolver) -> State {
        let mut data = self.data.clone();
        for (key, theirs) in &other.data {
            match data.get(key) {
                Some(mine) => {
                    let resolved = resolver.resolve_data(key, mine, theirs);
                    data.insert(key.clone(), resolved);
                }
                None => {
                    data.insert(key.clone(), theirs.clone());
                }
            }
        }

        let mut metadata = self.metadata.clone();
        for (key, theirs) in &other.metadata {
            match metadata.get(key) {
                Some(mine) => {
                    let resolved = resolver.resolve_metadata(key, mine, theirs);
                    metadata.insert(key.clone(), resolved);
                }
                None => {
                    metadata.insert(key.clone(), theirs.clone());
                }
            }
        }

        State { data, metadata }
    }

    /// A read-only snapshot of this state's key lists, suitable for
    /// inclusion in a [`crate::trace::TraceEntry`] without copying values.
    pub fn snapshot(&self) -> crate::trace::StateSnapshot {
        crate::trace::StateSnapshot {
            data_keys: self.data.keys().cloned().collect(),
            metadata_keys: self.metadata.keys().cloned().collect(),
            data_shapes: None,
        }
    }

    /// A verbose snapshot that additionally records each data value's JSON
    /// type tag (not the value itself) — see §4.4's leak-avoidance
    /// requirement for trace verbosity.
    pub fn verbose_snapshot(&self) -> crate::trace::StateSnapshot {
        let mut snap = self.snapshot();
        snap.data_shapes = Some(
            self.data
                .iter()
                .map(|(k, v)| (k.clone(), json_shape(v)))
                .collect(),
        );
        snap
    }
}

fn json_shape(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
