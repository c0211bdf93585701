use crate::errors::{TriageError, TriageResult};
use crate::judge::{ScoreBand, SimilarityJudge};
use crate::model::{Category, SimilarityScore};

pub(crate) async fn score_impl(
    judge: &SimilarityJudge,
    response: &str,
    category: Category,
) -> TriageResult<SimilarityScore> {
    if response.trim().is_empty() {
        return Err(TriageError::InvalidInput(
            "response to judge must not be empty".to_string(),
        ));
    }

    let examples = judge
        .examples
        .get(category)
        .ok_or_else(|| TriageError::UnknownCategory(category.to_string()))?;

    let prompt = super::prompt::build_prompt_impl(category, examples, response);
    let score = super::client::call_judge_impl(judge, &prompt).await?;

    tracing::info!(
        category = %category,
        score = score.value(),
        band = ?ScoreBand::of(score.value()),
        provider = judge.client.provider_name(),
        "similarity judged"
    );
    Ok(score)
}
