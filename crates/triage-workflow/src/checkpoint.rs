use crate::errors::GraphResult;
use crate::state::EmailState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Writer recorded for checkpoints created from caller input rather than a node.
pub const INPUT_WRITER: &str = "__input__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub thread_id: String,
    /// Monotonic per thread, starting at 0.
    pub step: u64,
    pub state: EmailState,
    /// Node to run on resume; `None` once the run has reached the end.
    pub next: Option<String>,
    pub written_by: String,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(
        thread_id: &str,
        step: u64,
        state: EmailState,
        next: Option<String>,
        written_by: &str,
    ) -> Self {
        Self {
            thread_id: thread_id.to_string(),
            step,
            state,
            next,
            written_by: written_by.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next.is_none()
    }
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn latest(&self, thread_id: &str) -> GraphResult<Option<Checkpoint>>;

    async fn put(&self, checkpoint: Checkpoint) -> GraphResult<()>;

    /// Oldest first.
    async fn history(&self, thread_id: &str) -> GraphResult<Vec<Checkpoint>>;
}

/// Process-local store; history lives as long as the value does.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointer {
    threads: Mutex<HashMap<String, Vec<Checkpoint>>>,
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.lock().map(|t| t.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointer {
    async fn latest(&self, thread_id: &str) -> GraphResult<Option<Checkpoint>> {
        let threads = self.threads.lock().unwrap_or_else(|p| p.into_inner());
        Ok(threads.get(thread_id).and_then(|h| h.last()).cloned())
    }

    async fn put(&self, checkpoint: Checkpoint) -> GraphResult<()> {
        tracing::trace!(
            thread_id = %checkpoint.thread_id,
            step = checkpoint.step,
            written_by = %checkpoint.written_by,
            next = ?checkpoint.next,
            "checkpoint"
        );
        let mut threads = self.threads.lock().unwrap_or_else(|p| p.into_inner());
        threads
            .entry(checkpoint.thread_id.clone())
            .or_default()
            .push(checkpoint);
        Ok(())
    }

    async fn history(&self, thread_id: &str) -> GraphResult<Vec<Checkpoint>> {
        let threads = self.threads.lock().unwrap_or_else(|p| p.into_inner());
        Ok(threads.get(thread_id).cloned().unwrap_or_default())
    }
}
