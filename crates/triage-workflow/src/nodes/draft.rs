use super::DRAFT_RESPONSE;
use crate::errors::GraphResult;
use crate::node::Node;
use crate::state::{EmailState, StateUpdate};
use async_trait::async_trait;
use std::sync::Arc;
use triage_core::providers::llm::LlmClient;
use triage_core::{Category, TriageError};

pub struct DraftResponse {
    llm: Arc<dyn LlmClient>,
}

impl DraftResponse {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

fn tone(category: Category) -> &'static str {
    match category {
        Category::Urgent => {
            "Acknowledge the urgency and say the matter is being handled immediately."
        }
        Category::Normal => "Thank the sender politely and say you will review and follow up.",
        Category::Spam => {
            "State briefly that the message has been flagged as spam and filtered. \
             Do not engage with the offer."
        }
    }
}

fn prompt(email: &str, category: Category, priority: u8) -> String {
    format!(
        "Draft a short reply to this email.\n\n\
         Category: {}\n\
         Priority: {}/10\n\
         Tone: {}\n\n\
         Email:\n{}\n\n\
         Reply with the response text only.",
        category,
        priority,
        tone(category),
        email
    )
}

#[async_trait]
impl Node for DraftResponse {
    fn name(&self) -> &'static str {
        DRAFT_RESPONSE
    }

    async fn run(&self, state: &EmailState) -> GraphResult<StateUpdate> {
        let email = state.require_email(DRAFT_RESPONSE)?;
        let category = state.require_category(DRAFT_RESPONSE)?;
        let priority = state.require_priority(DRAFT_RESPONSE)?;
        let provider = self.llm.provider_name();

        let resp = self
            .llm
            .complete(&prompt(email, category, priority), None)
            .await
            .map_err(|e| TriageError::from_provider(provider, e))?;

        let text = resp.text.trim();
        if text.is_empty() {
            return Err(
                TriageError::model_invocation(provider, "model returned an empty draft").into(),
            );
        }
        Ok(StateUpdate::default().with_response(text))
    }
}
