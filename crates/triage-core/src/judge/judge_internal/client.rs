use crate::errors::{TriageError, TriageResult};
use crate::judge::SimilarityJudge;
use crate::model::SimilarityScore;
use crate::structured::{invoke_structured, StructuredOutput};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct SimilarityScoreOutput {
    /// How similar is the response to the examples?
    #[schemars(range(min = 1, max = 99))]
    pub(crate) similarity_score: i64,
}

impl StructuredOutput for SimilarityScoreOutput {
    const NAME: &'static str = "similarity_score_output";
}

pub(crate) async fn call_judge_impl(
    judge: &SimilarityJudge,
    prompt: &str,
) -> TriageResult<SimilarityScore> {
    let system = super::prompt::system_prompt_impl(judge.config.hijack_defense);
    let out: SimilarityScoreOutput =
        invoke_structured(judge.client.as_ref(), prompt, Some(&system)).await?;

    // the schema already bounds the value; this guards providers that ignore it
    SimilarityScore::new(out.similarity_score).map_err(|e| {
        TriageError::model_invocation(judge.client.provider_name(), e.to_string())
    })
}
