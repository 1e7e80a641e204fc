//! API keys.
//!
//! A key is wrapped in [`ApiCredential`] as soon as it is read and is only
//! unwrapped where the request header is built. `Debug` and `Display` print
//! where the key came from, never the key.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Settings key holding an inline API key.
pub const API_KEY_SETTING: &str = "api_key";

/// Where a credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `api_key` in the provider settings
    Settings,
    /// The provider's environment variable
    Environment,
    /// Handed to a constructor in code
    Explicit,
}

impl CredentialSource {
    fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Settings => "settings",
            CredentialSource::Environment => "environment",
            CredentialSource::Explicit => "explicit",
        }
    }
}

pub struct ApiCredential {
    secret: SecretString,
    source: CredentialSource,
    env_var: &'static str,
}

impl ApiCredential {
    /// Wrap a key supplied in code. `env_var` only labels it.
    pub fn explicit(key: impl Into<String>, env_var: &'static str) -> Self {
        Self {
            secret: SecretString::from(key.into()),
            source: CredentialSource::Explicit,
            env_var,
        }
    }

    /// Find a key in `settings["api_key"]`, else in `env_var`.
    ///
    /// Blank values count as missing.
    pub fn resolve(settings: &JsonValue, env_var: &'static str) -> Result<Self, ProviderError> {
        let inline = settings[API_KEY_SETTING]
            .as_str()
            .filter(|key| !key.trim().is_empty())
            .map(|key| (key.to_string(), CredentialSource::Settings));

        let found = inline.or_else(|| {
            std::env::var(env_var)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(|key| (key, CredentialSource::Environment))
        });

        match found {
            Some((key, source)) => Ok(Self {
                secret: SecretString::from(key),
                source,
                env_var,
            }),
            None => Err(ProviderError::NotConfigured(format!(
                "no API key: set '{API_KEY_SETTING}' in provider settings or the {env_var} environment variable"
            ))),
        }
    }

    /// The raw key. Call only where it is sent.
    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiCredential({self})")
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} from {} [REDACTED]",
            self.env_var,
            self.source.as_str()
        )
    }
}
