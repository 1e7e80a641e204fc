//! Choosing a provider by name from configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{LlmProvider, ProviderError};

/// Builds one kind of provider from its JSON settings block.
pub trait ProviderFactory: Send + Sync {
    /// Name used in config, e.g. "anthropic".
    fn provider_type(&self) -> &'static str;

    /// Model used when the config does not name one.
    fn default_model(&self) -> &'static str;

    /// Reject settings that can never work, before any network call.
    fn validate_config(&self, _settings: &JsonValue) -> Result<(), ProviderError> {
        Ok(())
    }

    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError>;
}

/// Provider factories keyed by type name.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<&'static str, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every provider compiled into this build.
    #[allow(unused_mut)]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        #[cfg(feature = "anthropic")]
        registry.register(Arc::new(super::AnthropicProviderFactory));
        #[cfg(feature = "openai")]
        registry.register(Arc::new(super::OpenAiProviderFactory));
        registry
    }

    /// Add a factory; a later one with the same type replaces the earlier.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories.insert(factory.provider_type(), factory);
    }

    /// Validate `settings` and build a provider of `provider_type`.
    pub fn create(
        &self,
        provider_type: &str,
        settings: &JsonValue,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let factory = self.lookup(provider_type)?;
        factory.validate_config(settings)?;
        factory.create(settings)
    }

    pub fn default_model(&self, provider_type: &str) -> Result<&'static str, ProviderError> {
        Ok(self.lookup(provider_type)?.default_model())
    }

    /// Registered type names, sorted.
    pub fn available_types(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    fn lookup(&self, provider_type: &str) -> Result<&dyn ProviderFactory, ProviderError> {
        match self.factories.get(provider_type) {
            Some(factory) => Ok(factory.as_ref()),
            None => Err(ProviderError::NotConfigured(format!(
                "unknown provider '{}' (available: {})",
                provider_type,
                self.available_types().join(", ")
            ))),
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ChatMessage, CompletionConfig, CompletionResponse, TokenUsage};
    use async_trait::async_trait;

    struct CannedProvider(String);

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            Ok(CompletionResponse {
                content: self.0.clone(),
                usage: TokenUsage::default(),
                model: config.model.clone(),
                stop_reason: None,
            })
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    /// Requires a `reply` setting.
    struct CannedFactory;

    impl ProviderFactory for CannedFactory {
        fn provider_type(&self) -> &'static str {
            "canned"
        }

        fn default_model(&self) -> &'static str {
            "canned-1"
        }

        fn validate_config(&self, settings: &JsonValue) -> Result<(), ProviderError> {
            settings["reply"]
                .as_str()
                .map(|_| ())
                .ok_or_else(|| ProviderError::NotConfigured("reply is required".into()))
        }

        fn create(&self, settings: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
            let reply = settings["reply"].as_str().unwrap_or_default().to_string();
            Ok(Arc::new(CannedProvider(reply)))
        }
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(CannedFactory));
        registry
    }

    #[tokio::test]
    async fn test_create_registered_provider() {
        let provider = registry()
            .create("canned", &serde_json::json!({ "reply": "정확성: 5점" }))
            .unwrap();
        let response = provider
            .complete(vec![ChatMessage::user("x")], &CompletionConfig::default())
            .await
            .unwrap();

        assert_eq!(provider.name(), "canned");
        assert_eq!(response.content, "정확성: 5점");
    }

    #[test]
    fn test_create_runs_validation_first() {
        let err = registry().create("canned", &serde_json::json!({})).err().unwrap();
        assert_eq!(err, ProviderError::NotConfigured("reply is required".into()));
    }

    #[test]
    fn test_unknown_provider_lists_available() {
        match registry().create("unknown", &serde_json::json!({})).err() {
            Some(ProviderError::NotConfigured(msg)) => {
                assert!(msg.contains("unknown provider 'unknown'"));
                assert!(msg.contains("canned"));
            }
            other => panic!("expected NotConfigured, got {other:?}"),
        }
    }

    #[test]
    fn test_default_model_lookup() {
        assert_eq!(registry().default_model("canned").unwrap(), "canned-1");
        assert!(registry().default_model("missing").is_err());
    }

    #[cfg(all(feature = "anthropic", feature = "openai"))]
    #[test]
    fn test_defaults_register_compiled_providers() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.available_types(), vec!["anthropic", "openai"]);
    }
}
