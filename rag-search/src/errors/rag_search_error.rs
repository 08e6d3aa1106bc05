//! Unified error type for the rag-search crate.

use retry_policy::{RetryClass, message_looks_transient};
use thiserror::Error;

/// Errors produced by the search client, retriever, and indexer.
#[derive(Debug, Error)]
pub enum RagSearchError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Required environment variable is missing or empty.
    #[error("missing env variable: {key}")]
    EnvMissing { key: &'static str },

    /// Configuration value has the wrong shape (e.g. bad endpoint scheme).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O & filesystem ────────────────────────────────────────────────────
    /// Underlying I/O error (document files for the indexer).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // ── JSON / serialization ────────────────────────────────────────────────
    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Search service transport ────────────────────────────────────────────
    /// Transport-level failure from the HTTP client.
    #[error("transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Search service returned a non-success HTTP status.
    #[error("HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
        snippet: String,
    },

    /// Response payload could not be decoded as expected.
    #[error("decode error: {0}")]
    Decode(String),
}

impl RetryClass for RagSearchError {
    fn is_transient(&self) -> bool {
        match self {
            RagSearchError::HttpTransport(e) => {
                e.is_timeout() || e.is_connect() || message_looks_transient(&e.to_string())
            }
            _ => false,
        }
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
