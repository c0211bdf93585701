use super::LlmClient;
use crate::model::LlmResponse;
use crate::structured::OutputSchema;
use crate::vcr::{VcrClient, VcrMode};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAIClient {
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub client: reqwest::Client,
    /// Optional VCR client for record/replay (shared, requires mutex for async)
    vcr: Option<Arc<Mutex<VcrClient>>>,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            api_key,
            temperature,
            max_tokens,
            client: reqwest::Client::new(),
            vcr: None,
        }
    }

    pub fn with_vcr(mut self, vcr: Arc<Mutex<VcrClient>>) -> Self {
        self.vcr = Some(vcr);
        self
    }

    /// Enables VCR when `TRIAGE_VCR_MODE` selects record or replay.
    pub fn from_env(model: String, api_key: String, temperature: f32, max_tokens: u32) -> Self {
        let client = Self::new(model, api_key, temperature, max_tokens);
        if VcrMode::from_env() == VcrMode::Off {
            return client;
        }
        client.with_vcr(Arc::new(Mutex::new(VcrClient::from_env())))
    }

    fn request_body(&self, prompt: &str, system: Option<&[String]>) -> Value {
        let mut messages: Vec<Value> = system
            .unwrap_or_default()
            .iter()
            .map(|s| json!({ "role": "system", "content": s }))
            .collect();
        messages.push(json!({ "role": "user", "content": prompt }));

        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }

    fn structured_body(
        &self,
        prompt: &str,
        system: Option<&[String]>,
        schema: &OutputSchema,
    ) -> Value {
        let mut body = self.request_body(prompt, system);
        body["response_format"] = json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name(),
                "strict": true,
                "schema": schema.schema(),
            }
        });
        body
    }

    async fn send(&self, body: Value) -> anyhow::Result<LlmResponse> {
        let json: Value = if let Some(vcr) = &self.vcr {
            let mut vcr_guard = vcr.lock().await;
            let auth = format!("Bearer {}", self.api_key);
            let resp = vcr_guard.post_json(CHAT_URL, &body, Some(&auth)).await?;

            if !resp.is_success() {
                anyhow::bail!(
                    "OpenAI chat API error (status {}): {}",
                    resp.status,
                    resp.body
                );
            }
            resp.body
        } else {
            crate::providers::network::check_outbound(CHAT_URL)?;
            let resp = self
                .client
                .post(CHAT_URL)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let error_text = resp.text().await.unwrap_or_default();
                anyhow::bail!("OpenAI chat API error (status {}): {}", status, error_text);
            }

            resp.json().await?
        };

        if let Some(refusal) = json
            .pointer("/choices/0/message/refusal")
            .and_then(|v| v.as_str())
        {
            anyhow::bail!("OpenAI refused the request: {}", refusal);
        }

        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("OpenAI API response missing content"))?
            .to_string();

        let mut meta = json!({});
        if let Some(usage) = json.get("usage") {
            meta["usage"] = json!({
                "input_tokens": usage.get("prompt_tokens").cloned().unwrap_or(Value::Null),
                "output_tokens": usage.get("completion_tokens").cloned().unwrap_or(Value::Null),
            });
        }

        Ok(LlmResponse {
            text,
            provider: "openai".to_string(),
            model: json
                .get("model")
                .and_then(|v| v.as_str())
                .unwrap_or(&self.model)
                .to_string(),
            meta,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(
        &self,
        prompt: &str,
        system: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse> {
        self.send(self.request_body(prompt, system)).await
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        system: Option<&[String]>,
        schema: &OutputSchema,
    ) -> anyhow::Result<LlmResponse> {
        self.send(self.structured_body(prompt, system, schema)).await
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
