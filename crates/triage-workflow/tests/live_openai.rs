//! Runs the workflow against the configured model. Needs `OPENAI_API_KEY`;
//! `cargo test -- --ignored` to include.

use triage_core::providers::llm::build_client;
use triage_core::{Category, SimilarityJudge, TriageConfig};
use triage_workflow::nodes::priority_guidance;
use triage_workflow::{
    RunConfig, StateUpdate, TriageGraph, ASSIGN_PRIORITY, CATEGORIZE_EMAIL, DRAFT_RESPONSE,
};

fn live_config() -> TriageConfig {
    let mut cfg = TriageConfig::default();
    cfg.apply_env();
    cfg
}

#[tokio::test]
#[ignore = "calls the live model API"]
async fn live_full_graph() -> anyhow::Result<()> {
    let cfg = live_config();
    let graph = TriageGraph::new(build_client(&cfg.model)?);

    for (email, expected) in [
        ("this is urgent!", Category::Urgent),
        ("i wanna talk to you", Category::Normal),
        ("i have an offer for you", Category::Spam),
    ] {
        let result = graph
            .invoke(Some(StateUpdate::email(email)), &RunConfig::new_thread())
            .await?;
        assert_eq!(result.category, Some(expected), "email {:?}", email);
        let score = result.priority_score.unwrap_or_default();
        assert!(priority_guidance(expected).contains(&score), "score {}", score);
    }
    Ok(())
}

#[tokio::test]
#[ignore = "calls the live model API"]
async fn live_individual_nodes() -> anyhow::Result<()> {
    let cfg = live_config();
    let llm = build_client(&cfg.model)?;
    let graph = TriageGraph::new(llm.clone());

    let out = graph
        .node(CATEGORIZE_EMAIL)?
        .invoke(StateUpdate::email("check out this offer"))
        .await?;
    assert_eq!(out.category, Some(Category::Spam));

    let out = graph
        .node(ASSIGN_PRIORITY)?
        .invoke(StateUpdate::email("buy this pot.").with_category(Category::Spam))
        .await?;
    assert!(out.priority_score.is_some_and(|s| (1..=3).contains(&s)));

    let out = graph
        .node(DRAFT_RESPONSE)?
        .invoke(
            StateUpdate::email("Get rich quick!!! I have a pyramid scheme for you!")
                .with_category(Category::Spam)
                .with_priority(1),
        )
        .await?;
    let response = out.response.unwrap_or_default();

    let judge = SimilarityJudge::from_config(llm, &cfg.judge)?;
    let verdict = judge.evaluate(&response, "spam").await?;
    assert!(verdict.passed, "{:?} for {:?}", verdict, response);
    Ok(())
}

#[tokio::test]
#[ignore = "calls the live model API"]
async fn live_partial_execution() -> anyhow::Result<()> {
    let cfg = live_config();
    let graph = TriageGraph::new(build_client(&cfg.model)?);
    let run = RunConfig::new_thread();

    graph
        .update_state(
            &run,
            StateUpdate::email("please check out this offer").with_category(Category::Spam),
            CATEGORIZE_EMAIL,
        )
        .await?;
    let result = graph
        .invoke(None, &run.clone().interrupt_after(DRAFT_RESPONSE))
        .await?;
    assert!(result.priority_score.is_some_and(|s| (1..=3).contains(&s)));
    Ok(())
}
