mod judge_internal;
pub mod examples;
pub mod rubric;

pub use examples::{ReferenceExamples, MIN_EXAMPLES};
pub use rubric::ScoreBand;

use crate::config::JudgeConfig;
use crate::errors::TriageResult;
use crate::model::{Category, SimilarityScore};
use crate::providers::llm::LlmClient;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JudgeVerdict {
    pub category: Category,
    pub score: SimilarityScore,
    pub band: ScoreBand,
    pub threshold: u8,
    pub passed: bool,
}

/// Scores how closely a reply matches a category's reference examples, using a model
/// bound to a `{ similarity_score: 1..=99 }` output schema.
#[derive(Clone)]
pub struct SimilarityJudge {
    config: JudgeConfig,
    examples: ReferenceExamples,
    client: Arc<dyn LlmClient>,
}

impl SimilarityJudge {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            config: JudgeConfig::default(),
            examples: ReferenceExamples::defaults(),
            client,
        }
    }

    pub fn from_config(client: Arc<dyn LlmClient>, config: &JudgeConfig) -> TriageResult<Self> {
        let examples = ReferenceExamples::defaults().with_overrides(&config.examples)?;
        Ok(Self {
            config: config.clone(),
            examples,
            client,
        })
    }

    /// `category` is a label; anything outside the reference set is `UnknownCategory`.
    pub async fn score(&self, response: &str, category: &str) -> TriageResult<SimilarityScore> {
        let (category, _) = self.examples.for_label(category)?;
        self.score_category(response, category).await
    }

    pub async fn score_category(
        &self,
        response: &str,
        category: Category,
    ) -> TriageResult<SimilarityScore> {
        judge_internal::run::score_impl(self, response, category).await
    }

    pub async fn evaluate(&self, response: &str, category: &str) -> TriageResult<JudgeVerdict> {
        let (category, _) = self.examples.for_label(category)?;
        let score = self.score_category(response, category).await?;
        let threshold = self.config.pass_threshold;
        Ok(JudgeVerdict {
            category,
            score,
            band: ScoreBand::of(score.value()),
            threshold,
            passed: score.value() >= threshold,
        })
    }
}
