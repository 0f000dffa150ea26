use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use coordination::{CouncilConfig, StageResult};
use serde::Deserialize;

/// Optional TOML overrides layered on top of the environment.
///
/// ```toml
/// council_models = ["gemini-2.5-flash", "llama-3.3-70b-versatile"]
/// timeout_secs = 60
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub council_models: Option<Vec<String>>,
    pub chairman_model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub openrouter_url: Option<String>,
    pub groq_url: Option<String>,
    pub gemini_url: Option<String>,
    pub referer: Option<String>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Overwrite every field set in the file. Credentials stay env-only.
    pub fn apply(self, config: &mut CouncilConfig) {
        if let Some(models) = self.council_models {
            config.council_models = models;
        }
        if let Some(chairman) = self.chairman_model {
            config.chairman_model = chairman;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(url) = self.openrouter_url {
            config.openrouter_url = url;
        }
        if let Some(url) = self.groq_url {
            config.groq_url = url;
        }
        if let Some(url) = self.gemini_url {
            config.gemini_url = url;
        }
        if let Some(referer) = self.referer {
            config.referer = referer;
        }
    }
}

/// Environment first, then the optional file, then one validation pass.
pub fn load_config(path: Option<&Path>) -> Result<CouncilConfig> {
    load_config_with(|key| std::env::var(key).ok(), path)
}

pub fn load_config_with<F>(lookup: F, path: Option<&Path>) -> Result<CouncilConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config =
        CouncilConfig::overlay_lookup(lookup).context("Invalid council environment")?;

    match path {
        Some(path) => {
            FileConfig::from_path(path)?.apply(&mut config);
            config
                .validate()
                .with_context(|| format!("Invalid council config in {}", path.display()))?;
        }
        None => config.validate().context("Invalid council environment")?,
    }

    Ok(config)
}

/// Stage-1 answers as a JSON array of `{"model": ..., "response": ...}`.
pub fn load_stage1(path: &Path) -> Result<Vec<StageResult>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stage-1 results {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse stage-1 results {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config_with(no_env, None).unwrap();
        assert_eq!(config.council_models.len(), 4);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_file_overrides_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "council_models = [\"gemini-2.5-flash\", \"openai/gpt-4o\"]\ntimeout_secs = 45"
        )
        .unwrap();

        let env = |key: &str| match key {
            "COUNCIL_MODELS" => Some("llama-3.1-8b-instant".to_string()),
            "GROQ_API_KEY" => Some("gsk".to_string()),
            _ => None,
        };
        let config = load_config_with(env, Some(file.path())).unwrap();

        assert_eq!(config.council_models, vec!["gemini-2.5-flash", "openai/gpt-4o"]);
        assert_eq!(config.timeout, Duration::from_secs(45));
        assert_eq!(config.credentials.groq.as_deref(), Some("gsk"));
    }

    #[test]
    fn test_file_council_replaces_invalid_env_council() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "council_models = [\"gemini-2.5-flash\"]").unwrap();

        let env = |key: &str| (key == "COUNCIL_MODELS").then(|| "m1,m1".to_string());
        let config = load_config_with(env, Some(file.path())).unwrap();
        assert_eq!(config.council_models, vec!["gemini-2.5-flash"]);

        let err = load_config_with(env, None).unwrap_err();
        assert!(format!("{err:#}").contains("Model listed more than once: m1"));
    }

    #[test]
    fn test_unknown_file_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"nope\"").unwrap();
        assert!(load_config_with(no_env, Some(file.path())).is_err());
    }

    #[test]
    fn test_invalid_file_values_fail_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "council_models = []").unwrap();
        let err = load_config_with(no_env, Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("No models"));
    }

    #[test]
    fn test_load_stage1() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[{{"model":"m1","response":"one"}},{{"model":"m2","response":"two"}}]"#
        )
        .unwrap();
        let stage1 = load_stage1(file.path()).unwrap();
        assert_eq!(stage1.len(), 2);
        assert_eq!(stage1[1], StageResult::new("m2", "two"));
    }
}
