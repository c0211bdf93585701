pub mod fake;
pub mod openai;
pub mod tracing;

use crate::config::ModelConfig;
use crate::errors::{TriageError, TriageResult};
use crate::model::LlmResponse;
use crate::structured::OutputSchema;
use async_trait::async_trait;
use std::sync::Arc;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Plain completion. `system` entries are sent ahead of the prompt as system messages.
    async fn complete(
        &self,
        prompt: &str,
        system: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse>;

    /// Completion constrained to `schema`. Providers without native support get the
    /// schema appended to the prompt; the caller validates the result either way.
    async fn complete_structured(
        &self,
        prompt: &str,
        system: Option<&[String]>,
        schema: &OutputSchema,
    ) -> anyhow::Result<LlmResponse> {
        let prompt = format!("{}\n\n{}", prompt, schema.instruction());
        self.complete(&prompt, system).await
    }

    fn provider_name(&self) -> &'static str;
}

/// `provider:model` pair, e.g. `openai:gpt-4o`. A bare model name means OpenAI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: String,
    pub model: String,
}

impl ModelSpec {
    pub fn parse(raw: &str) -> TriageResult<Self> {
        let raw = raw.trim();
        let (provider, model) = match raw.split_once(':') {
            Some((p, m)) => (p.trim().to_ascii_lowercase(), m.trim()),
            None => ("openai".to_string(), raw),
        };
        if model.is_empty() {
            return Err(TriageError::Config(format!(
                "model spec '{}' has no model name",
                raw
            )));
        }
        Ok(Self {
            provider,
            model: model.to_string(),
        })
    }
}

impl std::fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

pub fn build_client(cfg: &ModelConfig) -> TriageResult<Arc<dyn LlmClient>> {
    let spec = ModelSpec::parse(&cfg.spec)?;
    let inner: Arc<dyn LlmClient> = match spec.provider.as_str() {
        "openai" => {
            let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
                TriageError::Config(format!(
                    "{} must be set to use model '{}'",
                    API_KEY_ENV, spec
                ))
            })?;
            Arc::new(openai::OpenAIClient::from_env(
                spec.model.clone(),
                api_key,
                cfg.temperature,
                cfg.max_tokens,
            ))
        }
        "fake" => Arc::new(fake::FakeClient::new(spec.model.clone())),
        other => {
            return Err(TriageError::Config(format!(
                "unsupported model provider '{}' (expected 'openai' or 'fake')",
                other
            )))
        }
    };
    ::tracing::debug!(model = %spec, "llm client ready");
    Ok(Arc::new(tracing::TracingLlmClient::new(inner)))
}
