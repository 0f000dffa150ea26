//! Direct Google Gemini client.
//!
//! Gemini's `generateContent` has no multi-turn role mix we rely on, so the
//! conversation is flattened: `system` turns become the system instruction,
//! `user` turns are kept verbatim and `assistant` turns are prefixed with
//! `Model: `, all joined by blank lines into a single prompt.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    http_client, non_empty_key, ProviderClient, ProviderError, ProviderKind, ProviderOutcome,
};
use crate::council::{CouncilConfig, CouncilError, Message, ProviderResponse, Role};

/// Prefix marking an earlier model turn inside the flattened prompt
const ASSISTANT_PREFIX: &str = "Model: ";

/// Finish reasons that mean the candidate was withheld for safety
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Conversation flattened into Gemini's single-prompt shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedPrompt {
    pub system_instruction: Option<String>,
    pub prompt: String,
}

/// Hoist system turns and join the rest into one prompt.
pub fn flatten_messages(messages: &[Message]) -> FlattenedPrompt {
    let mut system_parts: Vec<&str> = Vec::new();
    let mut prompt_parts: Vec<String> = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => system_parts.push(&msg.content),
            Role::User => prompt_parts.push(msg.content.clone()),
            Role::Assistant => prompt_parts.push(format!("{ASSISTANT_PREFIX}{}", msg.content)),
        }
    }

    FlattenedPrompt {
        system_instruction: if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        },
        prompt: prompt_parts.join("\n\n"),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            thought: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Direct Gemini client
pub struct GeminiClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Result<Self, CouncilError> {
        Ok(Self {
            api_key: non_empty_key(api_key),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }

    pub fn from_config(config: &CouncilConfig) -> Result<Self, CouncilError> {
        Self::new(config.credentials.gemini.clone(), config.gemini_url.clone())
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        timeout: Duration,
    ) -> ProviderOutcome {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential(ProviderKind::Gemini))?;

        let flat = flatten_messages(messages);
        let body = GenerateRequest {
            system_instruction: flat.system_instruction.map(|text| Content {
                role: None,
                parts: vec![Part::text(text)],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(flat.prompt)],
            }],
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status.as_u16(), body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        into_provider_response(parsed)
    }
}

fn into_provider_response(parsed: GenerateResponse) -> ProviderOutcome {
    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::Blocked(reason));
    }

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(ProviderError::MalformedResponse(
            "no candidates returned".to_string(),
        ));
    };

    let mut answer: Vec<String> = Vec::new();
    let mut thoughts: Vec<String> = Vec::new();
    for part in candidate.content.unwrap_or_default().parts {
        let Some(text) = part.text else { continue };
        if part.thought.unwrap_or(false) {
            thoughts.push(text);
        } else {
            answer.push(text);
        }
    }

    if answer.is_empty() {
        return Err(match candidate.finish_reason {
            Some(reason) if BLOCKING_FINISH_REASONS.contains(&reason.as_str()) => {
                ProviderError::Blocked(reason)
            }
            _ => ProviderError::MissingContent,
        });
    }

    Ok(ProviderResponse {
        content: answer.concat(),
        reasoning_details: if thoughts.is_empty() {
            None
        } else {
            Some(thoughts.join("\n"))
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn decode(raw: &str) -> ProviderOutcome {
        into_provider_response(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn test_flatten_hoists_system_and_prefixes_assistant() {
        let flat = flatten_messages(&[
            Message::system("You are terse."),
            Message::user("What is Rust?"),
            Message::assistant("A language."),
            Message::user("Elaborate."),
        ]);

        assert_eq!(flat.system_instruction.as_deref(), Some("You are terse."));
        assert_eq!(
            flat.prompt,
            "What is Rust?\n\nModel: A language.\n\nElaborate."
        );
    }

    #[test]
    fn test_flatten_joins_multiple_system_messages() {
        let flat = flatten_messages(&[
            Message::system("one"),
            Message::user("q"),
            Message::system("two"),
        ]);
        assert_eq!(flat.system_instruction.as_deref(), Some("one\n\ntwo"));
        assert_eq!(flat.prompt, "q");
    }

    #[test]
    fn test_flatten_without_system() {
        let flat = flatten_messages(&[Message::user("only")]);
        assert!(flat.system_instruction.is_none());
        assert_eq!(flat.prompt, "only");
    }

    #[test]
    fn test_parts_are_concatenated_and_thoughts_split_out() {
        let out = decode(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"plan","thought":true},
                {"text":"Hello, "},
                {"text":"world"}
            ]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(out.content, "Hello, world");
        assert_eq!(out.reasoning_details.as_deref(), Some("plan"));
    }

    #[test]
    fn test_prompt_block_reason_is_blocked() {
        let err = decode(r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .unwrap_err();
        assert_eq!(err, ProviderError::Blocked("SAFETY".to_string()));
    }

    #[test]
    fn test_safety_finish_without_text_is_blocked() {
        let err = decode(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap_err();
        assert_eq!(err, ProviderError::Blocked("SAFETY".to_string()));
    }

    #[test]
    fn test_stop_without_text_is_missing_content() {
        let err = decode(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"STOP"}]}"#)
            .unwrap_err();
        assert_eq!(err, ProviderError::MissingContent);
    }

    #[test]
    fn test_empty_candidates_without_block_reason_is_malformed() {
        let err = decode(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));

        let err = decode(r#"{}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_request_shape_against_mock_server() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .match_header("x-goog-api-key", "g-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "systemInstruction": {"parts": [{"text": "sys"}]},
                "contents": [{"role": "user", "parts": [{"text": "question"}]}]
            })))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#)
            .create_async()
            .await;

        let client =
            GeminiClient::new(Some("g-test".into()), format!("{}/v1beta/", server.url())).unwrap();
        let out = client
            .call(
                "gemini-2.5-flash",
                &[Message::system("sys"), Message::user("question")],
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(out.content, "ok");
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let client = GeminiClient::new(None, "http://127.0.0.1:9").unwrap();
        let err = client
            .call("gemini-2.0-flash", &[Message::user("q")], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::MissingCredential(ProviderKind::Gemini));
    }
}
