//! OpenAI-compatible chat completions codec
//!
//! Groq and OpenRouter both speak this wire format; they differ only in
//! endpoint and headers, which the caller sets on the request builder.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ProviderError, ProviderOutcome};
use crate::council::{Message, ProviderResponse};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// POST `messages` to an endpoint already carrying its URL and auth headers.
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    model: &str,
    messages: &[Message],
    timeout: Duration,
) -> ProviderOutcome {
    let response = request
        .timeout(timeout)
        .json(&ChatRequest { model, messages })
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::status(status.as_u16(), body));
    }

    let body: ChatResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    into_provider_response(body)
}

/// Normalize a decoded body. `null` content is a failure; `""` is not.
pub(crate) fn into_provider_response(body: ChatResponse) -> ProviderOutcome {
    let Some(choice) = body.choices.into_iter().next() else {
        return Err(match body.error {
            Some(err) => {
                let code = err.code.map(|c| c.to_string()).unwrap_or_default();
                ProviderError::Transport(format!("gateway error {code}: {}", err.message))
            }
            None => ProviderError::MalformedResponse("response has no choices".to_string()),
        });
    };

    let reasoning_details = choice.message.reasoning_details.and_then(|v| match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    });

    match choice.message.content {
        Some(content) => Ok(ProviderResponse {
            content,
            reasoning_details,
        }),
        None if choice.finish_reason.as_deref() == Some("content_filter") => {
            Err(ProviderError::Blocked("content_filter".to_string()))
        }
        None => Err(ProviderError::MissingContent),
    }
}
