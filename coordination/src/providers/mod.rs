//! Provider Clients
//!
//! Each client wraps one remote backend's calling convention and normalizes
//! the answer into a [`ProviderResponse`]:
//!
//! ```text
//! Backend        | Wire format                      | Role handling
//! ---------------|----------------------------------|------------------------------
//! Gemini         | generateContent (Google REST)    | system hoisted, turns flattened
//! Groq           | OpenAI chat completions          | passed through
//! OpenRouter     | OpenAI chat completions          | passed through
//! ```
//!
//! Failures are returned as [`ProviderError`] values and logged once by
//! [`ProviderClient::call`]; nothing escapes as a panic.

pub mod chat_completions;
pub mod gemini;
pub mod groq;
pub mod openrouter;

pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use openrouter::OpenRouterClient;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::council::{CouncilError, Message, ProviderResponse};

/// Longest error body kept in a [`ProviderError::Status`]
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Which backend family a client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Gemini, called directly
    Gemini,
    /// Groq fast inference for open-weight models, called directly
    Groq,
    /// OpenRouter gateway, addressed as `provider/model`
    OpenRouter,
}

impl ProviderKind {
    /// Environment variable the credential is conventionally read from
    pub fn credential_env(&self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_API_KEY",
            Self::Groq => "GROQ_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Groq => write!(f, "groq"),
            Self::OpenRouter => write!(f, "openrouter"),
        }
    }
}

/// Why a single provider call produced no content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("API key not configured for {0}")]
    MissingCredential(ProviderKind),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Blocked by content filter: {0}")]
    Blocked(String),

    #[error("Response parse error: {0}")]
    MalformedResponse(String),

    #[error("Response carried no content")]
    MissingContent,

    #[error("Provider task aborted: {0}")]
    Aborted(String),
}

impl ProviderError {
    /// Non-2xx response; the body is truncated for logging.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let body: String = body.into();
        let body = if body.chars().count() > MAX_ERROR_BODY_CHARS {
            let mut cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            cut.push_str("...");
            cut
        } else {
            body
        };
        Self::Status { status, body }
    }

    /// Map a reqwest failure, keeping timeouts distinguishable.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Transport(err.without_url().to_string())
        }
    }
}

/// Result of one provider call: content or an explicit failure
pub type ProviderOutcome = Result<ProviderResponse, ProviderError>;

/// Capability shared by every backend client
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Backend family this client talks to
    fn kind(&self) -> ProviderKind;

    /// Perform the backend request. Implementations translate `messages`
    /// into their native shape and must not panic.
    async fn complete(&self, model: &str, messages: &[Message], timeout: Duration)
        -> ProviderOutcome;

    /// [`complete`](Self::complete) plus the diagnostic log entry on failure.
    async fn call(&self, model: &str, messages: &[Message], timeout: Duration) -> ProviderOutcome {
        let start = Instant::now();
        let outcome = self.complete(model, messages, timeout).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            Ok(response) => debug!(
                provider = %self.kind(),
                model,
                elapsed_ms,
                chars = response.content.len(),
                "provider call succeeded"
            ),
            Err(e) => warn!(
                provider = %self.kind(),
                model,
                elapsed_ms,
                error = %e,
                "provider call failed"
            ),
        }

        outcome
    }
}

/// Shared HTTP client. Timeouts are set per request.
pub(crate) fn http_client() -> Result<reqwest::Client, CouncilError> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| CouncilError::Configuration(format!("failed to create HTTP client: {e}")))
}

/// Treat blank keys as missing.
pub(crate) fn non_empty_key(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}
