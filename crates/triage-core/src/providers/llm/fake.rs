use super::LlmClient;
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Offline client: replays scripted replies in order, then the fallback (if any).
/// Every prompt it sees is recorded for later inspection.
pub struct FakeClient {
    model: String,
    script: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    seen: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new(model: String) -> Self {
        Self {
            model,
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responses<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend(replies.into_iter().map(Into::into));
        self
    }

    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.seen.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(
        &self,
        prompt: &str,
        system: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse> {
        let mut full = String::new();
        for s in system.unwrap_or_default() {
            full.push_str(s);
            full.push('\n');
        }
        full.push_str(prompt);
        self.seen
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(full);

        let next = self
            .script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front();
        let text = match next.or_else(|| self.fallback.clone()) {
            Some(t) => t,
            None => anyhow::bail!("fake client '{}' has no more scripted replies", self.model),
        };

        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: self.model.clone(),
            meta: json!({}),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
