//! Configuration for the hosted model endpoint.

use std::fmt;

use url::Url;

use crate::error::{AssistantError, Result};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Environment variable the API key is read from unless overridden.
pub const DEFAULT_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Where the API key comes from.
///
/// The key is resolved on every call, never cached at construction time, so
/// a key added to or removed from the environment takes effect immediately.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Read from the named environment variable at call time.
    Env(String),
    /// A fixed key, mainly for tests and embedding hosts.
    Static(String),
}

impl Credential {
    /// Resolve the key, failing with a configuration error if it is missing or blank.
    pub fn resolve(&self) -> Result<String> {
        match self {
            Self::Env(var) => match std::env::var(var) {
                Ok(key) if !key.trim().is_empty() => Ok(key),
                _ => Err(AssistantError::Config(format!("{var} not set"))),
            },
            Self::Static(key) if key.trim().is_empty() => {
                Err(AssistantError::Config("API key is empty".into()))
            }
            Self::Static(key) => Ok(key.clone()),
        }
    }
}

// Never print the key itself.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
            Self::Static(_) => f.debug_tuple("Static").field(&"<redacted>").finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub model: String,
    pub api_base_url: String,
    pub credential: Credential,
}

impl AssistantConfig {
    /// Load configuration from environment variables.
    ///
    /// The API key itself is not read here; see [`Credential`].
    pub fn from_env() -> Result<Self> {
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let api_base_url = std::env::var("GEMINI_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());
        let api_base_url = validate_base_url(&api_base_url)?;

        let key_var =
            std::env::var("GEMINI_API_KEY_VAR").unwrap_or_else(|_| DEFAULT_API_KEY_VAR.into());

        Ok(Self {
            model,
            api_base_url,
            credential: Credential::Env(key_var),
        })
    }

    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder {
            model: DEFAULT_MODEL.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            credential: Credential::Env(DEFAULT_API_KEY_VAR.into()),
        }
    }
}

/// Check that `raw` is an absolute http(s) URL and strip any trailing slash.
pub fn validate_base_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw)
        .map_err(|e| AssistantError::Config(format!("invalid API base URL '{raw}': {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AssistantError::Config(format!(
            "invalid API base URL '{raw}': scheme must be http or https"
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Builder for constructing `AssistantConfig` in tests and embedding hosts.
pub struct AssistantConfigBuilder {
    model: String,
    api_base_url: String,
    credential: Credential,
}

impl AssistantConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Not validated; use [`validate_base_url`] for untrusted input.
    pub fn api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.credential = Credential::Static(api_key.into());
        self
    }

    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.credential = Credential::Env(var.into());
        self
    }

    pub fn build(self) -> AssistantConfig {
        AssistantConfig {
            model: self.model,
            api_base_url: self.api_base_url,
            credential: self.credential,
        }
    }
}
