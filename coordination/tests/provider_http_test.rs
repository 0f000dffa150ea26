//! HTTP-level test: real provider clients built from `CouncilConfig`,
//! pointed at mock backends, driven through a full debate round.

use std::time::Duration;

use coordination::{CouncilConfig, CouncilDebate, Label, ProviderCredentials, StageResult};
use mockito::{Matcher, Server};

fn labels(s: &str) -> Vec<Label> {
    s.chars().filter_map(Label::from_char).collect()
}

#[tokio::test]
async fn test_debate_round_against_mock_backends() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let mut gemini = Server::new_async().await;
    let mut groq = Server::new_async().await;
    let mut openrouter = Server::new_async().await;

    let gemini_mock = gemini
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .match_header("x-goog-api-key", "g-key")
        .match_body(Matcher::Regex("Response B:".to_string()))
        .with_status(200)
        .with_body(
            r#"{"candidates":[{"content":{"parts":[{"text":"Critique.\n\nFINAL RANKING:\n1. Response B\n2. Response A"}]}}]}"#,
        )
        .create_async()
        .await;

    let groq_mock = groq
        .mock("POST", "/openai/v1/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let openrouter_mock = openrouter
        .mock("POST", "/api/v1/chat/completions")
        .match_header("authorization", "Bearer or-key")
        .with_status(200)
        .with_body(
            r#"{"choices":[{"message":{"content":"FINAL RANKING:\n1. Response A\n2. Response B"}}]}"#,
        )
        .create_async()
        .await;

    let mut config = CouncilConfig::default()
        .with_council(["gemini-2.5-flash", "llama-3.1-8b-instant", "openai/gpt-4o"])
        .with_timeout(Duration::from_secs(10))
        .with_credentials(ProviderCredentials {
            gemini: Some("g-key".into()),
            groq: Some("gsk-key".into()),
            openrouter: Some("or-key".into()),
        });
    config.gemini_url = format!("{}/v1beta", gemini.url());
    config.groq_url = format!("{}/openai/v1/chat/completions", groq.url());
    config.openrouter_url = format!("{}/api/v1/chat/completions", openrouter.url());

    let debate = CouncilDebate::from_config(&config).unwrap();
    let stage1 = vec![
        StageResult::new("gemini-2.5-flash", "Rayleigh scattering."),
        StageResult::new("openai/gpt-4o", "Because of the ocean."),
    ];

    let round = debate
        .run_debate("Why is the sky blue?", &stage1, None)
        .await
        .unwrap();

    gemini_mock.assert_async().await;
    groq_mock.assert_async().await;
    openrouter_mock.assert_async().await;

    assert_eq!(round.results.len(), 3);

    let gemini_result = round.result_for("gemini-2.5-flash").unwrap();
    assert_eq!(gemini_result.parsed_ranking, labels("BA"));

    let groq_result = round.result_for("llama-3.1-8b-instant").unwrap();
    assert!(groq_result.raw_critique.is_none());
    assert!(groq_result.error.as_deref().unwrap().contains("503"));

    let gateway_result = round.result_for("openai/gpt-4o").unwrap();
    assert_eq!(gateway_result.parsed_ranking, labels("AB"));
}

#[tokio::test]
async fn test_missing_credentials_fail_per_model_only() {
    let mut openrouter = Server::new_async().await;
    let _mock = openrouter
        .mock("POST", "/chat")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"FINAL RANKING:\n1. Response A"}}]}"#)
        .create_async()
        .await;

    let mut config = CouncilConfig::default()
        .with_council(["gemini-2.0-flash", "openai/gpt-4o"])
        .with_credentials(ProviderCredentials {
            openrouter: Some("or-key".into()),
            ..Default::default()
        });
    config.openrouter_url = format!("{}/chat", openrouter.url());

    let debate = CouncilDebate::from_config(&config).unwrap();
    let round = debate
        .run_debate("q", &[StageResult::new("m1", "answer")], None)
        .await
        .unwrap();

    assert_eq!(round.results.len(), 2);
    let gemini = round.result_for("gemini-2.0-flash").unwrap();
    assert_eq!(
        gemini.error.as_deref(),
        Some("API key not configured for gemini")
    );
    assert_eq!(
        round.result_for("openai/gpt-4o").unwrap().parsed_ranking,
        labels("A")
    );
}
