use super::ASSIGN_PRIORITY;
use crate::errors::GraphResult;
use crate::node::Node;
use crate::state::{EmailState, StateUpdate};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::sync::Arc;
use triage_core::providers::llm::LlmClient;
use triage_core::structured::{invoke_structured, StructuredOutput};
use triage_core::{Category, TriageError};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct PriorityOutput {
    /// Priority from 1 (lowest) to 10 (highest).
    #[schemars(range(min = 1, max = 10))]
    priority_score: i64,
}

impl StructuredOutput for PriorityOutput {
    const NAME: &'static str = "email_priority";
}

/// Score range the model is steered towards for each category.
pub fn priority_guidance(category: Category) -> RangeInclusive<u8> {
    match category {
        Category::Urgent => 8..=10,
        Category::Normal => 4..=7,
        Category::Spam => 1..=3,
    }
}

pub struct AssignPriority {
    llm: Arc<dyn LlmClient>,
}

impl AssignPriority {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

fn prompt(email: &str, category: Category) -> String {
    let guidance = Category::ALL
        .iter()
        .map(|c| {
            let r = priority_guidance(*c);
            format!("- {}: {}-{}", c, r.start(), r.end())
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Assign a priority score from 1 (lowest) to 10 (highest) to this email, \
         which has been categorized as {}.\n\n\
         Use these ranges by category:\n{}\n\n\
         Email:\n{}",
        category, guidance, email
    )
}

#[async_trait]
impl Node for AssignPriority {
    fn name(&self) -> &'static str {
        ASSIGN_PRIORITY
    }

    async fn run(&self, state: &EmailState) -> GraphResult<StateUpdate> {
        let email = state.require_email(ASSIGN_PRIORITY)?;
        let category = state.require_category(ASSIGN_PRIORITY)?;

        let out: PriorityOutput =
            invoke_structured(self.llm.as_ref(), &prompt(email, category), None).await?;
        let score = u8::try_from(out.priority_score)
            .ok()
            .filter(|s| (1..=10).contains(s))
            .ok_or_else(|| {
                TriageError::model_invocation(
                    self.llm.provider_name(),
                    format!("priority_score {} outside 1..=10", out.priority_score),
                )
            })?;

        tracing::debug!(category = %category, priority_score = score, "priority assigned");
        Ok(StateUpdate::default().with_priority(score))
    }
}
