//! File-based [`TraceLogger`]: one newline-delimited JSON file per
//! session under a configured directory.

use crate::{TraceError, TraceLogger};
use agentkit_core::{SessionId, TraceEntry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

struct SessionFile {
    file: File,
    appends_since_flush: usize,
}

/// Flush after this many appends if no explicit flush/close has happened.
const FLUSH_EVERY: usize = 20;

/// Persists each session's trace as `<trace_dir>/<session-id>.trace.json`,
/// one JSON object per line. Readers must tolerate a truncated trailing
/// line if the process is killed between writes — this logger does not
/// guarantee the last line is complete unless `close` was called.
pub struct FileTraceLogger {
    trace_dir: PathBuf,
    open: Mutex<HashMap<String, SessionFile>>,
}

impl FileTraceLogger {
    /// Create a logger writing under `trace_dir`. The directory is not
    /// created until the first append.
    pub fn new(trace_dir: impl Into<PathBuf>) -> Self {
        Self {
            trace_dir: trace_dir.into(),
            open: Mutex::new(HashMap::new()),
        }
    }

    fn path_for(&self, session: &str) -> PathBuf {
        self.trace_dir.join(format!("{session}.trace.json"))
    }

    /// Flush and drop the open file handle for `session`, if any.
    pub async fn close(&self, session: &str) -> Result<(), TraceError> {
        let mut open = self.open.lock().await;
        if let Some(mut entry) = open.remove(session) {
            entry.file.flush().await.map_err(|e| TraceError::Io(e.to_string()))?;
        }
        Ok(())
    }

    /// Flush and drop every open file handle.
    pub async fn close_all(&self) -> Result<(), TraceError> {
        let mut open = self.open.lock().await;
        for (_, mut entry) in open.drain() {
            entry.file.flush().await.map_err(|e| TraceError::Io(e.to_string()))?;
        }
        Ok(())
    }

    async fn file_for(&self, session: &str) -> Result<(), TraceError> {
        let mut open = self.open.lock().await;
        if open.contains_key(session) {
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.trace_dir)
            .await
            .map_err(|e| TraceError::Io(e.to_string()))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(session))
            .await
            .map_err(|e| TraceError::Io(e.to_string()))?;
        open.insert(
            session.to_string(),
            SessionFile {
                file,
                appends_since_flush: 0,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl TraceLogger for FileTraceLogger {
    async fn append(&self, entry: TraceEntry) -> Result<(), TraceError> {
        let session = entry.session_id.clone();
        self.file_for(&session).await?;

        let mut line = serde_json::to_vec(&entry).map_err(|e| TraceError::Io(e.to_string()))?;
        line.push(b'\n');

        let mut open = self.open.lock().await;
        let session_file = open
            .get_mut(&session)
            .expect("file_for just inserted this session");
        session_file
            .file
            .write_all(&line)
            .await
            .map_err(|e| TraceError::Io(e.to_string()))?;
        session_file.appends_since_flush += 1;
        if session_file.appends_since_flush >= FLUSH_EVERY {
            session_file
                .file
                .flush()
                .await
                .map_err(|e| TraceError::Io(e.to_string()))?;
            session_file.appends_since_flush = 0;
        }
        Ok(())
    }

    async fn dump(&self, session: &SessionId) -> Result<Vec<TraceEntry>, TraceError> {
        read_trace_file(&self.path_for(session.as_str())).await
    }
}

/// Read a session's trace file directly from disk, tolerating a
/// truncated trailing line.
async fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(TraceError::Io(e.to_string())),
    };

    let mut entries = Vec::new();
    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TraceEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(_) => break, // truncated trailing line
        }
    }
    Ok(entries)
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
    async fn append_then_close_then_dump_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileTraceLogger::new(dir.path());
        logger.append(entry("s1", "e1")).await.unwrap();
        logger.append(entry("s1", "e2")).await.unwrap();
        logger.close("s1").await.unwrap();

        let out = logger.dump(&SessionId::new("s1")).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].event_id, "e1");
        assert_eq!(out[1].event_id, "e2");
    }

    #[tokio::test]
    async fn dump_of_unknown_session_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileTraceLogger::new(dir.path());
        let out = logger.dump(&SessionId::new("missing")).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn truncated_trailing_line_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s1.trace.json");
        let good = serde_json::to_string(&entry("s1", "e1")).unwrap();
        tokio::fs::write(&path, format!("{good}\n{{\"truncated\":")).await.unwrap();

        let logger = FileTraceLogger::new(dir.path());
        let out = logger.dump(&SessionId::new("s1")).await.unwrap();
        assert_eq!(out.len(), 1);
    }
}
