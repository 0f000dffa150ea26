//! LLM Council data model
//!
//! Shared vocabulary for the dispatch core and the debate protocol: chat
//! messages, normalized provider responses, stage-1 answers handed in by the
//! caller, and the batch-level error type.

pub mod config;

pub use config::{CouncilConfig, ProviderCredentials};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque model identifier, e.g. `gemini-2.5-flash` or `openai/gpt-4o`.
///
/// Used as the dispatch key, so it must be unique within one model set.
pub type ModelId = String;

/// Hard cap on debate participants: one single-letter label per response.
pub const MAX_PARTICIPANTS: usize = 26;

/// Errors that abort a whole council operation.
///
/// Per-model provider failures never surface here; they are carried as data
/// in the dispatch results (see [`crate::providers::ProviderError`]).
#[derive(Debug, Error)]
pub enum CouncilError {
    #[error("No models to dispatch and no default council configured")]
    NoModels,

    #[error("Model listed more than once: {0}")]
    DuplicateModel(ModelId),

    #[error("No stage-1 results to debate")]
    NoStageResults,

    #[error("Too many participants: got {got}, max {max}")]
    TooManyParticipants { got: usize, max: usize },

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of a conversation sent to a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A successful answer from any backend, normalized to one shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Answer text. May be empty, never absent on success.
    pub content: String,
    /// Backend-specific reasoning trace, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_details: Option<String>,
}

impl ProviderResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            reasoning_details: None,
        }
    }

    pub fn with_reasoning(mut self, details: impl Into<String>) -> Self {
        self.reasoning_details = Some(details.into());
        self
    }
}

/// One finalized stage-1 answer, supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub model: ModelId,
    pub response: String,
}

impl StageResult {
    pub fn new(model: impl Into<ModelId>, response: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            response: response.into(),
        }
    }
}

/// Human-facing name: the last `/`-separated segment of a model identifier.
pub fn short_model_name(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}
