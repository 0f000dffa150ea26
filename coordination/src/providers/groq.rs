//! Groq client for open-weight models (llama, mixtral, gemma).

use std::time::Duration;

use async_trait::async_trait;

use super::{
    chat_completions, http_client, non_empty_key, ProviderClient, ProviderError, ProviderKind,
    ProviderOutcome,
};
use crate::council::{CouncilConfig, CouncilError, Message};

/// Direct Groq client. Messages are sent as-is.
pub struct GroqClient {
    api_key: Option<String>,
    url: String,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn new(api_key: Option<String>, url: impl Into<String>) -> Result<Self, CouncilError> {
        Ok(Self {
            api_key: non_empty_key(api_key),
            url: url.into(),
            client: http_client()?,
        })
    }

    pub fn from_config(config: &CouncilConfig) -> Result<Self, CouncilError> {
        Self::new(config.credentials.groq.clone(), config.groq_url.clone())
    }
}

#[async_trait]
impl ProviderClient for GroqClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
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
            .ok_or(ProviderError::MissingCredential(ProviderKind::Groq))?;

        let request = self.client.post(&self.url).bearer_auth(api_key);

        chat_completions::send(request, model, messages, timeout).await
    }
}
