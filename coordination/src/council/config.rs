//! Council configuration
//!
//! Built once at startup and passed to the router and dispatcher by value.
//! Nothing in the core reads process environment after construction.

use std::collections::HashSet;
use std::time::Duration;

use super::{CouncilError, ModelId, MAX_PARTICIPANTS};

pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REFERER: &str = "http://localhost:5173";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CHAIRMAN: &str = "gemini-2.5-flash";

/// Built-in council when none is configured
pub const DEFAULT_COUNCIL: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "gemini-2.0-flash",
    "gemini-2.5-flash",
];

/// API keys for each backend. A missing key fails every call routed there.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub gemini: Option<String>,
    pub groq: Option<String>,
    pub openrouter: Option<String>,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |key: &Option<String>| if key.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("ProviderCredentials")
            .field("gemini", &mask(&self.gemini))
            .field("groq", &mask(&self.groq))
            .field("openrouter", &mask(&self.openrouter))
            .finish()
    }
}

/// Configuration for the council dispatch core
#[derive(Debug, Clone)]
pub struct CouncilConfig {
    pub credentials: ProviderCredentials,
    /// Models queried when the caller names none
    pub council_models: Vec<ModelId>,
    /// Synthesis model for the downstream chairman stage
    pub chairman_model: ModelId,
    /// Per-call request timeout
    pub timeout: Duration,
    pub openrouter_url: String,
    pub groq_url: String,
    /// Base URL; the client appends `/models/{model}:generateContent`
    pub gemini_url: String,
    /// `HTTP-Referer` sent to the gateway
    pub referer: String,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            credentials: ProviderCredentials::default(),
            council_models: DEFAULT_COUNCIL.iter().map(|m| m.to_string()).collect(),
            chairman_model: DEFAULT_CHAIRMAN.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            openrouter_url: DEFAULT_OPENROUTER_URL.to_string(),
            groq_url: DEFAULT_GROQ_URL.to_string(),
            gemini_url: DEFAULT_GEMINI_URL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
        }
    }
}

impl CouncilConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, CouncilError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`, then validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CouncilError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::overlay_lookup(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with values from `lookup`. Empty values count as unset.
    ///
    /// Only unparseable values fail here; call [`validate`](Self::validate)
    /// once every override layer has been applied.
    pub fn overlay_lookup<F>(lookup: F) -> Result<Self, CouncilError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        config.credentials = ProviderCredentials {
            gemini: get("GOOGLE_API_KEY"),
            groq: get("GROQ_API_KEY"),
            openrouter: get("OPENROUTER_API_KEY"),
        };

        if let Some(models) = get("COUNCIL_MODELS") {
            config.council_models = parse_model_list(&models);
        }
        if let Some(chairman) = get("CHAIRMAN_MODEL") {
            config.chairman_model = chairman;
        }
        if let Some(secs) = get("COUNCIL_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                CouncilError::Configuration(format!("COUNCIL_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(url) = get("OPENROUTER_API_URL") {
            config.openrouter_url = url;
        }

        Ok(config)
    }

    /// Override the default council
    pub fn with_council<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModelId>,
    {
        self.council_models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credentials(mut self, credentials: ProviderCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Check invariants the dispatch core relies on.
    pub fn validate(&self) -> Result<(), CouncilError> {
        if self.council_models.is_empty() {
            return Err(CouncilError::NoModels);
        }
        if self.council_models.len() > MAX_PARTICIPANTS {
            return Err(CouncilError::TooManyParticipants {
                got: self.council_models.len(),
                max: MAX_PARTICIPANTS,
            });
        }
        let mut seen = HashSet::new();
        for model in &self.council_models {
            if !seen.insert(model.as_str()) {
                return Err(CouncilError::DuplicateModel(model.clone()));
            }
        }
        if self.timeout.is_zero() {
            return Err(CouncilError::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split a comma-separated model list, dropping blanks.
pub fn parse_model_list(raw: &str) -> Vec<ModelId> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_council_config_default() {
        let config = CouncilConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.council_models.len(), 4);
        assert_eq!(config.chairman_model, "gemini-2.5-flash");
        assert!(config.credentials.gemini.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overlays_values() {
        let config = CouncilConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g-key"),
            ("GROQ_API_KEY", "  "),
            ("COUNCIL_MODELS", "m1, m2 ,,openai/gpt-4o"),
            ("COUNCIL_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.gemini.as_deref(), Some("g-key"));
        assert!(config.credentials.groq.is_none());
        assert_eq!(config.council_models, vec!["m1", "m2", "openai/gpt-4o"]);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overlay_lookup_defers_validation() {
        let lookup = lookup_from(&[("COUNCIL_MODELS", "m1,m1")]);
        let config = CouncilConfig::overlay_lookup(&lookup).unwrap();
        assert_eq!(config.council_models, vec!["m1", "m1"]);
        assert!(matches!(
            CouncilConfig::from_lookup(&lookup),
            Err(CouncilError::DuplicateModel(m)) if m == "m1"
        ));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = CouncilConfig::from_lookup(lookup_from(&[("COUNCIL_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, CouncilError::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_oversize() {
        let dup = CouncilConfig::default().with_council(["m1", "m2", "m1"]);
        assert!(matches!(
            dup.validate(),
            Err(CouncilError::DuplicateModel(m)) if m == "m1"
        ));

        let big = CouncilConfig::default().with_council((0..27).map(|i| format!("m{i}")));
        assert!(matches!(
            big.validate(),
            Err(CouncilError::TooManyParticipants { got: 27, max: 26 })
        ));

        let empty = CouncilConfig::default().with_council(Vec::<String>::new());
        assert!(matches!(empty.validate(), Err(CouncilError::NoModels)));
    }

    #[test]
    fn test_credentials_debug_masks_keys() {
        let creds = ProviderCredentials {
            gemini: Some("secret".into()),
            ..Default::default()
        };
        let dbg = format!("{:?}", creds);
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("<set>"));
    }
}
