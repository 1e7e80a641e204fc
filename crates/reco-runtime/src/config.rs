//! Runtime configuration.
//!
//! Loaded from YAML or JSON. Durations are written the human way
//! (`"2s"`, `"90s"`, `"1m 30s"`).
//!
//! ```yaml
//! provider:
//!   type: anthropic
//!   settings:
//!     base_url: https://api.anthropic.com/v1
//! generation:
//!   # omit to use the provider's default model
//!   model: claude-sonnet-4-5
//!   max_tokens: 4096
//!   timeout: 2m
//! retry:
//!   max_attempts: 3
//!   backoff_step: 2s
//! deadline: 5m
//! batch_concurrency: 4
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::providers::{CompletionConfig, LlmProvider, ProviderError, ProviderRegistry};
use crate::resilience::RetryPolicy;

/// Errors from loading or applying configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Which provider to build and its provider-specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Registered provider type, e.g. "anthropic"
    #[serde(rename = "type")]
    pub kind: String,

    /// Passed verbatim to the provider factory
    #[serde(default = "empty_settings")]
    pub settings: JsonValue,
}

fn empty_settings() -> JsonValue {
    JsonValue::Object(Default::default())
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: "anthropic".to_string(),
            settings: empty_settings(),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub provider: ProviderSettings,

    /// Settings for letter generation, refinement and style analysis
    pub generation: CompletionConfig,

    /// Settings for rubric judging
    pub evaluation: CompletionConfig,

    pub retry: RetryPolicy,

    /// Outer limit for one generation including retries
    #[serde(with = "duration_human::option")]
    pub deadline: Option<Duration>,

    /// Concurrent evaluations in a batch
    pub batch_concurrency: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::default(),
            generation: CompletionConfig::default(),
            evaluation: CompletionConfig::for_evaluation(),
            retry: RetryPolicy::default(),
            deadline: None,
            batch_concurrency: 4,
        }
    }
}

impl RuntimeConfig {
    /// Parse from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "batch_concurrency must be at least 1".to_string(),
            ));
        }
        for (name, completion) in [("generation", &self.generation), ("evaluation", &self.evaluation)] {
            if completion.max_tokens == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name}.max_tokens must be positive"
                )));
            }
        }
        Ok(())
    }

    /// Fill every unset `model` with the default of the configured provider.
    pub fn resolve_models(&mut self, registry: &ProviderRegistry) -> Result<(), ConfigError> {
        let default_model = registry.default_model(&self.provider.kind)?;
        for completion in [&mut self.generation, &mut self.evaluation] {
            if completion.model.trim().is_empty() {
                completion.model = default_model.to_string();
            }
        }
        Ok(())
    }

    /// Build the configured provider through the default registry.
    pub fn build_provider(&mut self) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        self.build_provider_with(&ProviderRegistry::with_defaults())
    }

    /// Build the configured provider through a caller-supplied registry,
    /// resolving unset models against it.
    pub fn build_provider_with(
        &mut self,
        registry: &ProviderRegistry,
    ) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        let provider = registry.create(&self.provider.kind, &self.provider.settings)?;
        self.resolve_models(registry)?;
        tracing::debug!(
            provider = provider.name(),
            model = %self.generation.model,
            "Provider created"
        );
        Ok(provider)
    }
}

/// Serde adapter for `Duration` fields written as `"2s"`, `"1m 30s"`.
pub mod duration_human {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }

    /// Same, for optional fields.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|text| humantime::parse_duration(&text).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.provider.kind, "anthropic");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.evaluation.max_tokens, 500);
        assert_eq!(config.batch_concurrency, 4);
        assert!(config.deadline.is_none());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
provider:
  type: openai
  settings:
    base_url: https://example.test/v1
generation:
  model: gpt-4o
  timeout: 2m
retry:
  max_attempts: 4
  backoff_step: 1s
deadline: 5m
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.provider.kind, "openai");
        assert_eq!(config.provider.settings["base_url"], "https://example.test/v1");
        assert_eq!(config.generation.model, "gpt-4o");
        assert_eq!(config.generation.timeout, Duration::from_secs(120));
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.backoff_step, Duration::from_secs(1));
        assert_eq!(config.deadline, Some(Duration::from_secs(300)));
        // Untouched sections keep their defaults
        assert_eq!(config.evaluation, CompletionConfig::for_evaluation());
    }

    #[test]
    fn test_from_json() {
        let config =
            RuntimeConfig::from_json(r#"{"batch_concurrency": 2, "deadline": "30s"}"#).unwrap();
        assert_eq!(config.batch_concurrency, 2);
        assert_eq!(config.deadline, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let err = RuntimeConfig::from_yaml("batch_concurrency: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_duration() {
        assert!(RuntimeConfig::from_yaml("deadline: soon").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::from_file("/nonexistent/reco.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_yaml_round_trip_keeps_durations_readable() {
        let config = RuntimeConfig {
            deadline: Some(Duration::from_secs(90)),
            ..RuntimeConfig::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("1m 30s"));
        assert_eq!(RuntimeConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_unknown_provider_type() {
        let mut config = RuntimeConfig {
            provider: ProviderSettings {
                kind: "carrier-pigeon".to_string(),
                settings: empty_settings(),
            },
            ..RuntimeConfig::default()
        };
        let err = config.build_provider_with(&ProviderRegistry::new()).err().unwrap();
        assert!(matches!(err, ConfigError::Provider(ProviderError::NotConfigured(_))));
    }

    struct StubProvider;

    #[async_trait::async_trait]
    impl LlmProvider for StubProvider {
        async fn complete(
            &self,
            _messages: Vec<crate::providers::ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<crate::providers::CompletionResponse, ProviderError> {
            Err(ProviderError::NotConfigured("stub".into()))
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Registers as "openai" without touching the network.
    struct StubOpenAiFactory;

    impl crate::providers::ProviderFactory for StubOpenAiFactory {
        fn provider_type(&self) -> &'static str {
            "openai"
        }

        fn default_model(&self) -> &'static str {
            "gpt-4o"
        }

        fn create(&self, _settings: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
            Ok(Arc::new(StubProvider))
        }
    }

    fn stub_registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StubOpenAiFactory));
        registry
    }

    #[test]
    fn test_unset_models_take_provider_default() {
        let mut config = RuntimeConfig::from_yaml("provider:\n  type: openai\n").unwrap();
        assert!(config.generation.model.is_empty());

        config.build_provider_with(&stub_registry()).unwrap();

        assert_eq!(config.generation.model, "gpt-4o");
        assert_eq!(config.evaluation.model, "gpt-4o");
        assert_eq!(config.evaluation.max_tokens, 500);
    }

    #[test]
    fn test_explicit_model_is_kept() {
        let yaml = "provider:\n  type: openai\nevaluation:\n  model: gpt-4o-mini\n";
        let mut config = RuntimeConfig::from_yaml(yaml).unwrap();

        config.resolve_models(&stub_registry()).unwrap();

        assert_eq!(config.generation.model, "gpt-4o");
        assert_eq!(config.evaluation.model, "gpt-4o-mini");
    }

    #[cfg(feature = "openai")]
    #[test]
    fn test_openai_config_without_model_resolves_to_gpt_4o() {
        let yaml = "provider:\n  type: openai\n  settings:\n    api_key: sk-test\n";
        let mut config = RuntimeConfig::from_yaml(yaml).unwrap();

        let provider = config.build_provider().unwrap();

        assert_eq!(provider.name(), "openai");
        assert_eq!(config.generation.model, "gpt-4o");
    }
}
