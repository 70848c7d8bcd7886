//! Typed ID wrappers for event, agent, and session identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers prevent mixing up event IDs, agent names, and
/// session IDs at call sites. These are just strings underneath — no
/// UUID enforcement, no format requirement. The core doesn't care what
/// your IDs look like, only that they're stable and hashable.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(EventId, "Unique identifier for an event, assigned at creation.");
typed_id!(AgentId, "Name of a registered agent handler.");
typed_id!(
    SessionId,
    "Correlates all events and agent executions belonging to one trajectory."
);

/// Generate a monotonically-increasing, sortable event id.
///
/// Combines a millisecond timestamp with a per-process atomic counter so
/// ids are unique even when many events are created within the same
/// millisecond. Not a UUID — the core does not require a specific id
/// format, only uniqueness (see [`EventId`]).
pub fn new_event_id() -> EventId {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    EventId::new(format!("evt_{millis:x}_{seq:x}"))
}
