use thiserror::Error;

pub type TriageResult<T> = Result<T, TriageError>;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("unknown category '{0}' (expected one of: urgent, normal, spam)")]
    UnknownCategory(String),

    #[error("model invocation failed (provider={provider}): {detail}")]
    ModelInvocation { provider: String, detail: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config error: {0}")]
    Config(String),
}

impl TriageError {
    pub fn model_invocation(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ModelInvocation {
            provider: provider.into(),
            detail: detail.into(),
        }
    }

    /// Collapses a provider-side `anyhow` chain into a `ModelInvocation`.
    pub fn from_provider(provider: &str, err: anyhow::Error) -> Self {
        Self::model_invocation(provider, format!("{:#}", err))
    }

    pub fn is_model_invocation(&self) -> bool {
        matches!(self, Self::ModelInvocation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_chain_is_flattened() {
        let err = anyhow::anyhow!("connection reset").context("POST chat/completions");
        let mapped = TriageError::from_provider("openai", err);
        let msg = mapped.to_string();
        assert!(mapped.is_model_invocation());
        assert!(msg.contains("provider=openai"));
        assert!(msg.contains("POST chat/completions: connection reset"));
    }
}
