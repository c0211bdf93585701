//! Categorize → prioritize → draft workflow over a
//! [`LlmClient`](triage_core::providers::llm::LlmClient),
//! with thread-scoped checkpoints so runs can be paused, edited and resumed.

pub mod checkpoint;
pub mod config;
pub mod errors;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod state;

pub use checkpoint::{Checkpoint, CheckpointStore, InMemoryCheckpointer, INPUT_WRITER};
pub use config::RunConfig;
pub use errors::{GraphError, GraphResult};
pub use graph::{NodeHandle, TriageGraph};
pub use node::Node;
pub use nodes::{ASSIGN_PRIORITY, CATEGORIZE_EMAIL, DRAFT_RESPONSE};
pub use state::{EmailState, StateUpdate};
