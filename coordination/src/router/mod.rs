//! Provider Router
//!
//! Picks the backend for a model identifier. First match wins:
//!
//! ```text
//! Identifier                      | Contains '/'? | Client
//! --------------------------------|---------------|-----------
//! *gemini*                        | no            | Gemini
//! *llama* / *mixtral* / *gemma*   | no            | Groq
//! anything else                   | -             | OpenRouter
//! ```
//!
//! Matching is case-insensitive. Routing never fails: unknown identifiers go
//! to the gateway, which treats them as `provider/model`.

use std::sync::Arc;

use crate::council::{CouncilConfig, CouncilError};
use crate::providers::{GeminiClient, GroqClient, OpenRouterClient, ProviderClient, ProviderKind};

/// Marker for models served directly by Google
pub const GEMINI_MARKER: &str = "gemini";

/// Open-weight families served directly by Groq
pub const OPEN_WEIGHT_MARKERS: &[&str] = &["llama", "mixtral", "gemma"];

/// A `provider/model` identifier always goes through the gateway
pub const PROVIDER_SEPARATOR: char = '/';

/// Routing policy as a pure function of the identifier.
pub fn route(model: &str) -> ProviderKind {
    let lower = model.to_lowercase();
    let qualified = lower.contains(PROVIDER_SEPARATOR);

    if !qualified && lower.contains(GEMINI_MARKER) {
        return ProviderKind::Gemini;
    }
    if !qualified && OPEN_WEIGHT_MARKERS.iter().any(|m| lower.contains(m)) {
        return ProviderKind::Groq;
    }
    ProviderKind::OpenRouter
}

/// Client table consulted by the dispatcher
#[derive(Clone)]
pub struct ProviderRouter {
    gemini: Arc<dyn ProviderClient>,
    groq: Arc<dyn ProviderClient>,
    gateway: Arc<dyn ProviderClient>,
}

impl ProviderRouter {
    /// Build the three real HTTP clients from configuration.
    pub fn from_config(config: &CouncilConfig) -> Result<Self, CouncilError> {
        Ok(Self {
            gemini: Arc::new(GeminiClient::from_config(config)?),
            groq: Arc::new(GroqClient::from_config(config)?),
            gateway: Arc::new(OpenRouterClient::from_config(config)?),
        })
    }

    /// Build from explicit clients (fakes in tests, custom transports).
    pub fn with_clients(
        gemini: Arc<dyn ProviderClient>,
        groq: Arc<dyn ProviderClient>,
        gateway: Arc<dyn ProviderClient>,
    ) -> Self {
        Self {
            gemini,
            groq,
            gateway,
        }
    }

    /// Client serving a backend family
    pub fn client(&self, kind: ProviderKind) -> Arc<dyn ProviderClient> {
        match kind {
            ProviderKind::Gemini => Arc::clone(&self.gemini),
            ProviderKind::Groq => Arc::clone(&self.groq),
            ProviderKind::OpenRouter => Arc::clone(&self.gateway),
        }
    }

    /// Client that handles `model`
    pub fn client_for(&self, model: &str) -> Arc<dyn ProviderClient> {
        self.client(route(model))
    }
}

impl std::fmt::Debug for ProviderRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRouter")
            .field("gemini", &self.gemini.kind())
            .field("groq", &self.groq.kind())
            .field("gateway", &self.gateway.kind())
            .finish()
    }
}
