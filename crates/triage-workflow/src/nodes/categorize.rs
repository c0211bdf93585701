use super::CATEGORIZE_EMAIL;
use crate::errors::GraphResult;
use crate::node::Node;
use crate::state::{EmailState, StateUpdate};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use triage_core::providers::llm::LlmClient;
use triage_core::structured::{invoke_structured, StructuredOutput};
use triage_core::Category;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct CategoryOutput {
    category: Category,
}

impl StructuredOutput for CategoryOutput {
    const NAME: &'static str = "email_category";
}

pub struct CategorizeEmail {
    llm: Arc<dyn LlmClient>,
}

impl CategorizeEmail {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

fn prompt(email: &str) -> String {
    format!(
        "Categorize the following email as exactly one of: urgent, normal, spam.\n\n\
         - urgent: needs immediate attention or action\n\
         - normal: ordinary correspondence, questions, updates\n\
         - spam: unsolicited offers, promotions, scams\n\n\
         Email:\n{}",
        email
    )
}

#[async_trait]
impl Node for CategorizeEmail {
    fn name(&self) -> &'static str {
        CATEGORIZE_EMAIL
    }

    async fn run(&self, state: &EmailState) -> GraphResult<StateUpdate> {
        let email = state.require_email(CATEGORIZE_EMAIL)?;
        let out: CategoryOutput =
            invoke_structured(self.llm.as_ref(), &prompt(email), None).await?;
        tracing::debug!(category = %out.category, "email categorized");
        Ok(StateUpdate::default().with_category(out.category))
    }
}
