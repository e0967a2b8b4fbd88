//! Error types for the Minecraft provider.
//!
//! Three layers mirror where a failure originates:
//!
//! - [`ConfigError`]: the provider could not be configured (fatal to initialization).
//! - [`ClientError`]: an HTTP call to the Minecraft API failed.
//! - [`ProviderError`]: what every provider and reconciler operation returns.
//!
//! Every [`ProviderError`] can be turned into a user-facing [`Diagnostic`]
//! with [`ProviderError::to_diagnostic`].

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Diagnostic;

/// Errors raised while resolving the provider configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither the declared attribute nor its environment variable yielded a value.
    #[error(
        "Unable to set {field}, please set either the {field} property in the provider \
         or the environment variable '{env_var}'"
    )]
    Missing {
        /// The provider attribute that is missing.
        field: &'static str,
        /// The environment variable that would satisfy it.
        env_var: &'static str,
    },

    /// A value was supplied but cannot be used.
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// The provider attribute that is invalid.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// `configure` was called more than once.
    #[error("Provider has already been configured")]
    AlreadyConfigured,
}

/// Errors returned by the HTTP client adapter.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-200 status.
    #[error("expected status 200, got status: {status}, message: {body}")]
    Status {
        /// HTTP method of the failed request.
        method: &'static str,
        /// Full request URL.
        url: String,
        /// Status code returned by the server.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request could not be sent or the response not received (includes timeouts).
    #[error("unable to execute request: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 200 response carried a body that could not be decoded.
    #[error("unable to decode response from {url}: {source}")]
    Decode {
        /// Full request URL.
        url: String,
        /// The decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// The schema bundle to upload could not be read.
    #[error("unable to open schema file: {}, err: {source}", path.display())]
    Bundle {
        /// Path of the bundle file.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// The HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Decode { .. } | Self::Bundle { .. } => None,
        }
    }

    /// Whether the server reported the target as not found.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether the request timed out before a response arrived.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}

/// Errors that can occur in a provider operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A call to the Minecraft API failed.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// A local file could not be hashed.
    #[error("Unable to generate hash for schema file {}: {source}", path.display())]
    Io {
        /// Path of the file being hashed.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The remote object does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A data source lookup failed.
    #[error("{summary}: {source}")]
    DataSource {
        /// Headline of the resulting diagnostic.
        summary: &'static str,
        /// The failed call.
        #[source]
        source: ClientError,
    },

    /// The resource configuration failed schema validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persisted state is missing a value the operation depends on.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An operation ran before `configure`.
    #[error("Provider is not configured")]
    NotConfigured,

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A state or config document did not match the expected shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Short summary used as the diagnostic headline.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::NotConfigured => "Configuration Error",
            Self::Client(_) => "Client Error",
            Self::Io { .. } => "Unable to generate hash for file",
            Self::NotFound(_) => "Resource Not Found",
            Self::DataSource { summary, .. } => *summary,
            Self::Validation(_) => "Invalid Resource Configuration",
            Self::InvalidState(_) => "Invalid Resource State",
            Self::UnknownResource(_) => "Unknown Resource Type",
            Self::Serialization(_) => "Unable to Decode State",
        }
    }

    /// Convert into an error diagnostic for the host.
    ///
    /// Client failures keep the status code and raw body in the detail.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.summary()).with_detail(self.to_string())
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        err.to_diagnostic()
    }
}
