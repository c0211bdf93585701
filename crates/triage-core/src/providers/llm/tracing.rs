use crate::model::LlmResponse;
use crate::providers::llm::LlmClient;
use crate::structured::OutputSchema;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info_span, Instrument, Span};

/// Wraps a client in a `gen_ai.client.request` span carrying model, usage and error fields.
/// Prompt text is never recorded.
pub struct TracingLlmClient {
    inner: Arc<dyn LlmClient>,
}

impl TracingLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>) -> Self {
        Self { inner }
    }

    fn request_span(&self, structured: Option<&str>) -> Span {
        info_span!(
            "gen_ai.client.request",
            "gen_ai.system" = self.inner.provider_name(),
            "triage.structured_output" = structured.unwrap_or(""),
            "gen_ai.request.model" = tracing::field::Empty,
            "gen_ai.usage.input_tokens" = tracing::field::Empty,
            "gen_ai.usage.output_tokens" = tracing::field::Empty,
            "error" = tracing::field::Empty,
            "error.message" = tracing::field::Empty
        )
    }
}

fn record_outcome(result: &anyhow::Result<LlmResponse>) {
    let span = Span::current();
    match result {
        Ok(resp) => {
            span.record("gen_ai.request.model", resp.model.as_str());
            if let Some(usage) = resp.meta.get("usage") {
                if let Some(i) = usage.get("input_tokens").and_then(|v| v.as_u64()) {
                    span.record("gen_ai.usage.input_tokens", i);
                }
                if let Some(o) = usage.get("output_tokens").and_then(|v| v.as_u64()) {
                    span.record("gen_ai.usage.output_tokens", o);
                }
            }
        }
        Err(e) => {
            span.record("error", true);
            span.record("error.message", e.to_string().as_str());
            tracing::warn!(error = %e, "llm request failed");
        }
    }
}

#[async_trait]
impl LlmClient for TracingLlmClient {
    async fn complete(
        &self,
        prompt: &str,
        system: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse> {
        async move {
            let result = self.inner.complete(prompt, system).await;
            record_outcome(&result);
            result
        }
        .instrument(self.request_span(None))
        .await
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        system: Option<&[String]>,
        schema: &OutputSchema,
    ) -> anyhow::Result<LlmResponse> {
        async move {
            let result = self.inner.complete_structured(prompt, system, schema).await;
            record_outcome(&result);
            result
        }
        .instrument(self.request_span(Some(schema.name())))
        .await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
