//! In-memory, bounded-ring [`TraceLogger`] implementation.
//!
//! Uses a `HashMap` behind a `RwLock` for concurrent access, mirroring
//! the concurrency shape of a simple in-process key/value store: one
//! lock guarding a map, short critical sections, no lock held across an
//! `.await`.

use crate::{TraceError, TraceLogger};
use agentkit_core::{SessionId, TraceEntry};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

const DEFAULT_CAP: usize = 10_000;

/// In-memory trace store: one bounded ring buffer per session.
///
/// Past `cap` entries for a session, the oldest entry is dropped
/// silently to make room for the newest — this is documented behavior,
/// not an error condition, since traces are a debugging aid and not the
/// system of record.
pub struct InMemoryTraceLogger {
    cap: usize,
    sessions: RwLock<HashMap<String, VecDeque<TraceEntry>>>,
}

impl InMemoryTraceLogger {
    /// Create a logger with the default per-session cap (10,000 entries).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAP)
    }

    /// Create a logger with an explicit per-session ring capacity.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTraceLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TraceLogger for InMemoryTraceLogger {
    async fn append(&self, entry: TraceEntry) -> Result<(), TraceError> {
        let mut sessions = self.sessions.write().await;
        let ring = sessions.entry(entry.session_id.clone()).or_default();
        if ring.len() >= self.cap {
            ring.pop_front();
        }
        ring.push_back(entry);
        Ok(())
    }

    async fn dump(&self, session: &SessionId) -> Result<Vec<TraceEntry>, TraceError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session.as_str())
            .map(|ring| ring.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkit_core::hook::HookPoint;
    use agentkit_core::trace::StateSnapshot;

    fn entry(session: &str, event: &str) -> TraceEntry {
        TraceEntry::for_event(HookPoint::BeforeEventHandling, session, event, StateSnapshot::default())
    }

    #[tokio::test]
    async fn dump_of_unknown_session_is_empty() {
        let logger = InMemoryTraceLogger::new();
        let out = logger.dump(&SessionId::new("nope")).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn append_then_dump_preserves_order() {
        let logger = InMemoryTraceLogger::new();
        logger.append(entry("s1", "e1")).await.unwrap();
        logger.append(entry("s1", "e2")).await.unwrap();
        let out = logger.dump(&SessionId::new("s1")).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].event_id, "e1");
        assert_eq!(out[1].event_id, "e2");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let logger = InMemoryTraceLogger::new();
        logger.append(entry("s1", "e1")).await.unwrap();
        logger.append(entry("s2", "e1")).await.unwrap();
        assert_eq!(logger.dump(&SessionId::new("s1")).await.unwrap().len(), 1);
        assert_eq!(logger.dump(&SessionId::new("s2")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ring_drops_oldest_past_capacity() {
        let logger = InMemoryTraceLogger::with_capacity(2);
        logger.append(entry("s1", "e1")).await.unwrap();
        logger.append(entry("s1", "e2")).await.unwrap();
        logger.append(entry("s1", "e3")).await.unwrap();
        let out = logger.dump(&SessionId::new("s1")).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].event_id, "e2");
        assert_eq!(out[1].event_id, "e3");
    }
}
