//! Completion configuration read strictly from environment variables.

use std::time::Duration;

use retry_policy::RetryPolicy;

use crate::error_handler::{AiCompletionError, env_or, must_env, validate_http_endpoint};

/// Per-request timeout for completion calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Deployment used when `AZURE_OPENAI_DEPLOYMENT_NAME` is unset.
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";

/// API version used when `AZURE_OPENAI_API_VERSION` is unset.
pub const DEFAULT_API_VERSION: &str = "2023-12-01-preview";

/// Connection parameters for the hosted completion deployment.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub endpoint: String,
    /// Key sent via the `api-key` header.
    pub api_key: String,
    /// Deployment (model) name, also selects invocation parameters.
    pub deployment: String,
    /// REST API version.
    pub api_version: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry parameters for completion calls.
    pub retry: RetryPolicy,
}

impl CompletionConfig {
    /// Reads the completion configuration from the environment.
    ///
    /// # Errors
    /// - [`crate::error_handler::ConfigError::MissingVar`] if
    ///   `AZURE_OPENAI_ENDPOINT` or `AZURE_OPENAI_API_KEY` is absent/empty
    /// - [`crate::error_handler::ConfigError::InvalidFormat`] for a
    ///   non-HTTP endpoint
    pub fn from_env() -> Result<Self, AiCompletionError> {
        let endpoint = must_env("AZURE_OPENAI_ENDPOINT")?;
        validate_http_endpoint("AZURE_OPENAI_ENDPOINT", &endpoint)?;
        let api_key = must_env("AZURE_OPENAI_API_KEY")?;

        Ok(Self {
            endpoint,
            api_key,
            deployment: env_or("AZURE_OPENAI_DEPLOYMENT_NAME", DEFAULT_DEPLOYMENT),
            api_version: env_or("AZURE_OPENAI_API_VERSION", DEFAULT_API_VERSION),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::new(3, Duration::from_secs(2), Duration::from_secs(30)),
        })
    }
}
