//! OpenRouter gateway client, the catch-all for `provider/model` identifiers.

use std::time::Duration;

use async_trait::async_trait;

use super::{
    chat_completions, http_client, non_empty_key, ProviderClient, ProviderError, ProviderKind,
    ProviderOutcome,
};
use crate::council::{CouncilConfig, CouncilError, Message};

/// Gateway client. Messages are sent as-is; `reasoning_details` is kept.
pub struct OpenRouterClient {
    api_key: Option<String>,
    url: String,
    referer: String,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(
        api_key: Option<String>,
        url: impl Into<String>,
        referer: impl Into<String>,
    ) -> Result<Self, CouncilError> {
        Ok(Self {
            api_key: non_empty_key(api_key),
            url: url.into(),
            referer: referer.into(),
            client: http_client()?,
        })
    }

    pub fn from_config(config: &CouncilConfig) -> Result<Self, CouncilError> {
        Self::new(
            config.credentials.openrouter.clone(),
            config.openrouter_url.clone(),
            config.referer.clone(),
        )
    }
}

#[async_trait]
impl ProviderClient for OpenRouterClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenRouter
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
            .ok_or(ProviderError::MissingCredential(ProviderKind::OpenRouter))?;

        let request = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer);

        chat_completions::send(request, model, messages, timeout).await
    }
}
