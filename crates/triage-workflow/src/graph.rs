use crate::checkpoint::{Checkpoint, CheckpointStore, InMemoryCheckpointer, INPUT_WRITER};
use crate::config::RunConfig;
use crate::errors::{GraphError, GraphResult};
use crate::node::Node;
use crate::nodes::{AssignPriority, CategorizeEmail, DraftResponse};
use crate::state::{EmailState, StateUpdate};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::Instrument;
use triage_core::providers::llm::LlmClient;

/// Linear workflow: nodes run in order, and every step is checkpointed per thread.
#[derive(Clone)]
pub struct TriageGraph {
    nodes: Vec<Arc<dyn Node>>,
    checkpointer: Arc<dyn CheckpointStore>,
}

/// A single node, runnable outside of any thread.
pub struct NodeHandle<'g> {
    node: &'g dyn Node,
}

impl NodeHandle<'_> {
    pub fn name(&self) -> &'static str {
        self.node.name()
    }

    /// Runs the node on a state built from `input` and returns only its own writes.
    pub async fn invoke(&self, input: StateUpdate) -> GraphResult<StateUpdate> {
        let state = EmailState::from(input);
        self.node
            .run(&state)
            .instrument(tracing::info_span!("node", node = self.node.name()))
            .await
    }
}

impl TriageGraph {
    /// categorize_email → assign_priority → draft_response, checkpointed in memory.
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self::with_checkpointer(llm, Arc::new(InMemoryCheckpointer::new()))
    }

    pub fn with_checkpointer(
        llm: Arc<dyn LlmClient>,
        checkpointer: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            nodes: vec![
                Arc::new(CategorizeEmail::new(llm.clone())),
                Arc::new(AssignPriority::new(llm.clone())),
                Arc::new(DraftResponse::new(llm)),
            ],
            checkpointer,
        }
    }

    pub fn from_nodes(
        nodes: Vec<Arc<dyn Node>>,
        checkpointer: Arc<dyn CheckpointStore>,
    ) -> GraphResult<Self> {
        if nodes.is_empty() {
            return Err(GraphError::InvalidGraph("graph has no nodes".into()));
        }
        let mut seen = HashSet::new();
        for node in &nodes {
            if !seen.insert(node.name()) {
                return Err(GraphError::InvalidGraph(format!(
                    "duplicate node name '{}'",
                    node.name()
                )));
            }
        }
        Ok(Self {
            nodes,
            checkpointer,
        })
    }

    pub fn node_names(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|n| n.name()).collect()
    }

    pub fn node(&self, name: &str) -> GraphResult<NodeHandle<'_>> {
        let idx = self.position(name)?;
        Ok(NodeHandle {
            node: self.nodes[idx].as_ref(),
        })
    }

    pub fn checkpointer(&self) -> &Arc<dyn CheckpointStore> {
        &self.checkpointer
    }

    /// `Some(input)` starts a new run at the entry node, on top of whatever the thread
    /// already holds. `None` resumes the thread from its last checkpoint.
    pub async fn invoke(
        &self,
        input: Option<StateUpdate>,
        config: &RunConfig,
    ) -> GraphResult<EmailState> {
        for name in &config.interrupt_after {
            self.position(name)?;
        }
        let thread_id = config.thread_id.as_str();
        let saved = self.checkpointer.latest(thread_id).await?;

        let (mut state, start, mut step) = match input {
            Some(input) => {
                let (mut state, step) = match saved {
                    Some(cp) => (cp.state, cp.step + 1),
                    None => (EmailState::default(), 0),
                };
                state.apply(input);
                state.require_email(self.nodes[0].name())?;
                let entry = self.nodes[0].name().to_string();
                self.checkpointer
                    .put(Checkpoint::new(
                        thread_id,
                        step,
                        state.clone(),
                        Some(entry),
                        INPUT_WRITER,
                    ))
                    .await?;
                (state, 0, step)
            }
            None => {
                let cp = saved.ok_or_else(|| GraphError::NoCheckpoint(thread_id.to_string()))?;
                let Some(next) = cp.next.as_deref() else {
                    tracing::debug!(thread_id, "thread already finished; nothing to resume");
                    return Ok(cp.state);
                };
                let start = self.position(next)?;
                (cp.state, start, cp.step)
            }
        };

        tracing::info!(
            thread_id,
            start = self.nodes[start].name(),
            "workflow run started"
        );

        for idx in start..self.nodes.len() {
            let node = &self.nodes[idx];
            let update = node
                .run(&state)
                .instrument(tracing::info_span!("node", node = node.name(), thread_id))
                .await?;
            state.apply(update);

            step += 1;
            self.checkpointer
                .put(Checkpoint::new(
                    thread_id,
                    step,
                    state.clone(),
                    self.successor(idx),
                    node.name(),
                ))
                .await?;

            if config.interrupts_after(node.name()) {
                tracing::info!(thread_id, node = node.name(), "workflow interrupted");
                return Ok(state);
            }
        }

        tracing::info!(
            thread_id,
            category = ?state.category,
            priority_score = ?state.priority_score,
            "workflow run finished"
        );
        Ok(state)
    }

    /// Writes `values` into the thread as though `as_node` had produced them; the next
    /// `invoke(None, ..)` continues with the node after it.
    pub async fn update_state(
        &self,
        config: &RunConfig,
        values: StateUpdate,
        as_node: &str,
    ) -> GraphResult<Checkpoint> {
        let idx = self.position(as_node)?;
        let thread_id = config.thread_id.as_str();

        let (mut state, step) = match self.checkpointer.latest(thread_id).await? {
            Some(cp) => (cp.state, cp.step + 1),
            None => (EmailState::default(), 0),
        };
        state.apply(values);

        let checkpoint = Checkpoint::new(thread_id, step, state, self.successor(idx), as_node);
        self.checkpointer.put(checkpoint.clone()).await?;
        tracing::info!(thread_id, as_node, next = ?checkpoint.next, "state updated");
        Ok(checkpoint)
    }

    pub async fn get_state(&self, config: &RunConfig) -> GraphResult<Option<Checkpoint>> {
        self.checkpointer.latest(&config.thread_id).await
    }

    fn position(&self, name: &str) -> GraphResult<usize> {
        self.nodes
            .iter()
            .position(|n| n.name() == name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    fn successor(&self, idx: usize) -> Option<String> {
        self.nodes.get(idx + 1).map(|n| n.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use triage_core::Category;

    struct Stamp(&'static str);

    #[async_trait]
    impl Node for Stamp {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn run(&self, state: &EmailState) -> GraphResult<StateUpdate> {
            let prior = state.response.clone().unwrap_or_default();
            Ok(StateUpdate::default().with_response(format!("{}{};", prior, self.0)))
        }
    }

    fn stamps(names: &[&'static str]) -> TriageGraph {
        let nodes: Vec<Arc<dyn Node>> = names
            .iter()
            .map(|n| Arc::new(Stamp(n)) as Arc<dyn Node>)
            .collect();
        TriageGraph::from_nodes(nodes, Arc::new(InMemoryCheckpointer::new())).unwrap()
    }

    #[test]
    fn duplicate_or_missing_nodes_are_rejected() {
        let dup: Vec<Arc<dyn Node>> = vec![Arc::new(Stamp("a")), Arc::new(Stamp("a"))];
        let err = TriageGraph::from_nodes(dup, Arc::new(InMemoryCheckpointer::new()))
            .err()
            .unwrap();
        assert!(matches!(err, GraphError::InvalidGraph(_)));
        assert!(TriageGraph::from_nodes(vec![], Arc::new(InMemoryCheckpointer::new())).is_err());
    }

    #[tokio::test]
    async fn runs_in_order_and_checkpoints_each_step() {
        let graph = stamps(&["a", "b", "c"]);
        let cfg = RunConfig::thread("t");

        let state = graph
            .invoke(Some(StateUpdate::email("x")), &cfg)
            .await
            .unwrap();
        assert_eq!(state.response.as_deref(), Some("a;b;c;"));

        let history = graph.checkpointer().history("t").await.unwrap();
        let writers: Vec<&str> = history.iter().map(|c| c.written_by.as_str()).collect();
        assert_eq!(writers, vec![INPUT_WRITER, "a", "b", "c"]);
        let steps: Vec<u64> = history.iter().map(|c| c.step).collect();
        assert_eq!(steps, vec![0, 1, 2, 3]);
        assert!(history.last().unwrap().is_finished());
    }

    #[tokio::test]
    async fn interrupt_then_resume() {
        let graph = stamps(&["a", "b", "c"]);
        let cfg = RunConfig::thread("t").interrupt_after("a");

        let paused = graph
            .invoke(Some(StateUpdate::email("x")), &cfg)
            .await
            .unwrap();
        assert_eq!(paused.response.as_deref(), Some("a;"));
        let cp = graph.get_state(&cfg).await.unwrap().unwrap();
        assert_eq!(cp.next.as_deref(), Some("b"));

        let done = graph.invoke(None, &RunConfig::thread("t")).await.unwrap();
        assert_eq!(done.response.as_deref(), Some("a;b;c;"));

        // finished threads resume to the same state without running anything
        let again = graph.invoke(None, &RunConfig::thread("t")).await.unwrap();
        assert_eq!(again, done);
    }

    #[tokio::test]
    async fn new_input_on_existing_thread_keeps_unset_fields() {
        let graph = stamps(&["a"]);
        let cfg = RunConfig::thread("t");
        graph
            .update_state(
                &cfg,
                StateUpdate::email("old").with_category(Category::Normal),
                "a",
            )
            .await
            .unwrap();

        let state = graph
            .invoke(Some(StateUpdate::email("new")), &cfg)
            .await
            .unwrap();
        assert_eq!(state.email.as_deref(), Some("new"));
        assert_eq!(state.category, Some(Category::Normal));
    }

    #[tokio::test]
    async fn resume_requires_checkpoint_and_known_nodes() {
        let graph = stamps(&["a", "b"]);
        let err = graph.invoke(None, &RunConfig::thread("nope")).await.unwrap_err();
        assert!(matches!(err, GraphError::NoCheckpoint(ref t) if t == "nope"));

        let err = graph
            .invoke(
                Some(StateUpdate::email("x")),
                &RunConfig::thread("t").interrupt_after("zzz"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode(ref n) if n == "zzz"));

        let err = graph
            .update_state(&RunConfig::thread("t"), StateUpdate::default(), "zzz")
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode(_)));
        assert!(graph.node("zzz").is_err());
    }
}
