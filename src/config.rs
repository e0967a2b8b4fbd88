//! Provider configuration.
//!
//! The provider block accepts `endpoint`, `api_key` and `timeout_seconds`.
//! Each field resolves independently: a declared, non-empty value wins,
//! otherwise the matching environment variable is used. `endpoint` and
//! `api_key` are mandatory; `timeout_seconds` falls back to
//! [`DEFAULT_TIMEOUT_SECS`].

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::schema::{Attribute, Schema};

/// Environment variable consulted for the endpoint.
pub const ENDPOINT_ENV: &str = "MINECRAFT_ENDPOINT";

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "MINECRAFT_APIKEY";

/// Environment variable consulted for the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "MINECRAFT_TIMEOUT";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The provider block as declared by the user. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfigInput {
    /// Base URL of the Minecraft API.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API key sent with every request.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout_seconds: Option<i64>,
}

impl ProviderConfigInput {
    /// Decode the provider block from the host's JSON form. `null` means "nothing declared".
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
    }
}

/// Fully resolved provider configuration. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl ProviderConfig {
    /// Build a configuration directly from known values.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: normalize_endpoint(endpoint.into()),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve against the process environment.
    pub fn resolve(input: &ProviderConfigInput) -> Result<Self, ConfigError> {
        Self::resolve_with(input, |name| std::env::var(name).ok())
    }

    /// Resolve against an arbitrary environment lookup.
    pub fn resolve_with<F>(input: &ProviderConfigInput, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = pick(input.endpoint.as_deref(), ENDPOINT_ENV, &env).ok_or(
            ConfigError::Missing {
                field: "endpoint",
                env_var: ENDPOINT_ENV,
            },
        )?;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "endpoint",
                reason: format!("'{}' must start with http:// or https://", endpoint),
            });
        }

        let api_key =
            pick(input.api_key.as_deref(), API_KEY_ENV, &env).ok_or(ConfigError::Missing {
                field: "api_key",
                env_var: API_KEY_ENV,
            })?;

        let timeout_secs = match input.timeout_seconds {
            Some(secs) => secs,
            None => match env(TIMEOUT_ENV).filter(|v| !v.is_empty()) {
                Some(raw) => raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                    field: "timeout_seconds",
                    reason: format!("{} is not an integer: {}", TIMEOUT_ENV, e),
                })?,
                None => DEFAULT_TIMEOUT_SECS as i64,
            },
        };
        if timeout_secs <= 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_seconds",
                reason: format!("must be positive, got {}", timeout_secs),
            });
        }

        Ok(Self::new(endpoint, api_key).with_timeout(Duration::from_secs(timeout_secs as u64)))
    }

    /// Base URL without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Connection settings for the Minecraft API")
            .with_attribute(
                "endpoint",
                Attribute::optional_string().with_description(format!(
                    "Base URL of the Minecraft API. Falls back to {}",
                    ENDPOINT_ENV
                )),
            )
            .with_attribute(
                "api_key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "API key for the Minecraft API. Falls back to {}",
                        API_KEY_ENV
                    )),
            )
            .with_attribute(
                "timeout_seconds",
                Attribute::optional_int64().with_description(format!(
                    "Per-request timeout in seconds. Falls back to {}, then {}",
                    TIMEOUT_ENV, DEFAULT_TIMEOUT_SECS
                )),
            )
    }
}

// Keeps the key out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn pick<F>(declared: Option<&str>, env_var: &str, env: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    declared
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| env(env_var).filter(|v| !v.is_empty()))
}

fn normalize_endpoint(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}
