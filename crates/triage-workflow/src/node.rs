use crate::errors::GraphResult;
use crate::state::{EmailState, StateUpdate};
use async_trait::async_trait;

/// One step of the workflow. Reads the current state, returns only what it changed.
#[async_trait]
pub trait Node: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, state: &EmailState) -> GraphResult<StateUpdate>;
}
