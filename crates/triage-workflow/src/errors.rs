use thiserror::Error;
use triage_core::TriageError;

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Triage(#[from] TriageError),

    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("node '{node}' requires '{field}' in state")]
    MissingField { node: String, field: &'static str },

    #[error("no checkpoint for thread '{0}'; invoke with input first")]
    NoCheckpoint(String),

    #[error("invalid graph: {0}")]
    InvalidGraph(String),
}

impl GraphError {
    pub fn missing(node: &str, field: &'static str) -> Self {
        Self::MissingField {
            node: node.to_string(),
            field,
        }
    }

    /// The underlying triage error, if this failure came from the model or domain layer.
    pub fn as_triage(&self) -> Option<&TriageError> {
        match self {
            Self::Triage(e) => Some(e),
            _ => None,
        }
    }
}
