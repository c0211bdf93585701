use serde::{Deserialize, Serialize};

/// Per-call settings: which thread's checkpoints to use, and where to pause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub thread_id: String,
    #[serde(default)]
    pub interrupt_after: Vec<String>,
}

impl RunConfig {
    pub fn thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            interrupt_after: Vec::new(),
        }
    }

    pub fn new_thread() -> Self {
        Self::thread(uuid::Uuid::new_v4().to_string())
    }

    pub fn interrupt_after(mut self, node: impl Into<String>) -> Self {
        self.interrupt_after.push(node.into());
        self
    }

    pub fn interrupts_after(&self, node: &str) -> bool {
        self.interrupt_after.iter().any(|n| n == node)
    }
}
