//! Unified error handling for `ai-completion-service`.
//!
//! A single top-level [`AiCompletionError`] for the whole crate, with
//! config-time errors grouped in [`ConfigError`]. Helpers for reading
//! environment variables return the unified type.

use retry_policy::{RetryClass, message_looks_transient};
use reqwest::StatusCode;
use thiserror::Error;

/// Unified result alias for the crate.
pub type Result<T> = std::result::Result<T, AiCompletionError>;

/// Top-level error for the completion client.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiCompletionError {
    /// Configuration/validation errors (startup time).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Underlying HTTP transport error.
    #[error("transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Upstream returned a non-successful HTTP status.
    #[error("HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Response payload could not be decoded as expected.
    #[error("decode error: {0}")]
    Decode(String),

    /// The completion response carried no usable choice.
    #[error("completion response contained no choices")]
    EmptyChoices,
}

impl RetryClass for AiCompletionError {
    fn is_transient(&self) -> bool {
        match self {
            AiCompletionError::HttpTransport(e) => {
                e.is_timeout() || e.is_connect() || message_looks_transient(&e.to_string())
            }
            // Status, decode and config failures are not connectivity
            // problems; retrying would repeat the same outcome.
            _ => false,
        }
    }
}

/// Errors raised while loading or validating configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// Value had the wrong format (e.g. invalid URL scheme).
    #[error("invalid format in {var}: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },
}

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// [`ConfigError::MissingVar`] if the variable is absent or empty.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Fetches an environment variable, falling back to `default` when unset or
/// empty.
pub fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Trims a response body to a short, single-line snippet for logs and errors.
pub fn make_snippet(body: &str) -> String {
    let line = body.split_whitespace().collect::<Vec<_>>().join(" ");
    match line.char_indices().nth(200) {
        Some((idx, _)) => format!("{}…", &line[..idx]),
        None => line,
    }
}
