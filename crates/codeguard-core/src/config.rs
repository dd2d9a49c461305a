use crate::client::RetryPolicy;
use crate::error::{CodeGuardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "codeguard.toml";

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "CODEGUARD_MODEL";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Optional overrides read from `codeguard.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub analysis: AnalysisSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelSection {
    pub base_url: Option<String>,
    pub name: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RetrySection {
    pub max_attempts: Option<u32>,
    /// Linear backoff unit for rate-limit and server errors.
    pub base_delay_ms: Option<u64>,
    /// Delay before retrying any other failure.
    pub flat_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisSection {
    /// Files analyzed at the same time.
    pub concurrency: Option<usize>,
}

/// Fixed settings of the model backend. Built once and shared by every call.
#[derive(Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub retry: RetryPolicy,
    pub concurrency: usize,
}

impl AppConfig {
    /// Load configuration from an explicit file, or from `codeguard.toml` in
    /// the working directory when present, then apply the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(CodeGuardError::PathNotFound(path.display().to_string()));
                }
                load_config_file(path)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    load_config_file(default_path)?
                } else {
                    ConfigFile::default()
                }
            }
        };
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Merge defaults, file overrides and environment. The credential only
    /// comes from the environment and its absence is fatal.
    pub fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = env(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CodeGuardError::MissingCredential(API_KEY_VAR.to_string()))?;

        let base_url = env(BASE_URL_VAR)
            .or(file.model.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = env(MODEL_VAR)
            .or(file.model.name)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: file.retry.max_attempts.unwrap_or(defaults.max_attempts).max(1),
            base_delay: file
                .retry
                .base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            flat_delay: file
                .retry
                .flat_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.flat_delay),
        };

        Ok(Self {
            model: ModelConfig {
                api_key,
                base_url: base_url.trim_end_matches('/').to_string(),
                model,
                max_tokens: file.model.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                temperature: file.model.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                timeout: Duration::from_secs(
                    file.model.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
                ),
            },
            retry,
            concurrency: file.analysis.concurrency.unwrap_or(1).max(1),
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Parse a `codeguard.toml` file.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| CodeGuardError::ConfigParse(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn resolve_fails_without_credential() {
        let err = AppConfig::resolve(ConfigFile::default(), env_of(&[])).unwrap_err();
        assert!(matches!(err, CodeGuardError::MissingCredential(_)));
        assert!(err.to_string().contains(API_KEY_VAR));
    }

    #[test]
    fn resolve_rejects_blank_credential() {
        let err =
            AppConfig::resolve(ConfigFile::default(), env_of(&[(API_KEY_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, CodeGuardError::MissingCredential(_)));
    }

    #[test]
    fn resolve_uses_defaults() {
        let config =
            AppConfig::resolve(ConfigFile::default(), env_of(&[(API_KEY_VAR, "sk-test")])).unwrap();

        assert_eq!(config.model.model, DEFAULT_MODEL);
        assert_eq!(config.model.max_tokens, 2000);
        assert_eq!(config.model.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model.timeout, Duration::from_secs(60));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn env_overrides_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            [model]
            name = "gpt-4o-mini"
            base_url = "http://localhost:8080/v1/"
            max_tokens = 512

            [retry]
            max_attempts = 5
            base_delay_ms = 10
            flat_delay_ms = 5

            [analysis]
            concurrency = 4
            "#,
        )
        .unwrap();
        let config = AppConfig::resolve(
            file,
            env_of(&[(API_KEY_VAR, "sk-test"), (MODEL_VAR, "gpt-4-turbo")]),
        )
        .unwrap();

        assert_eq!(config.model.model, "gpt-4-turbo");
        assert_eq!(config.model.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model.max_tokens, 512);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(10));
        assert_eq!(config.retry.flat_delay, Duration::from_millis(5));
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn debug_output_hides_key() {
        let config =
            AppConfig::resolve(ConfigFile::default(), env_of(&[(API_KEY_VAR, "sk-secret")]))
                .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn load_config_file_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[model\nname = 1").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, CodeGuardError::ConfigParse(_)));
    }

    #[test]
    fn load_rejects_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, CodeGuardError::PathNotFound(_)));
    }
}
