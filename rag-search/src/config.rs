//! Search configuration read strictly from environment variables.

use std::time::Duration;

use retry_policy::RetryPolicy;

use crate::errors::RagSearchError;

/// Default number of documents pulled into the RAG context.
pub const DEFAULT_TOP_K: usize = 3;

/// REST API version sent with every search/index call.
pub const DEFAULT_API_VERSION: &str = "2023-11-01";

/// Connection parameters for the managed search index.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Service endpoint, e.g. `https://my-service.search.windows.net`.
    pub endpoint: String,
    /// Admin/query key sent via the `api-key` header.
    pub api_key: String,
    /// Index queried by the retriever.
    pub index_name: String,
    /// REST API version.
    pub api_version: String,
    /// Snippet count cap for retrieval.
    pub top_k: usize,
    /// Retry parameters for search calls.
    pub retry: RetryPolicy,
}

impl SearchConfig {
    /// Reads the search configuration from the environment.
    ///
    /// # Errors
    /// [`RagSearchError::EnvMissing`] if any of `AZURE_SEARCH_SERVICE_ENDPOINT`,
    /// `AZURE_SEARCH_ADMIN_KEY`, or `AZURE_SEARCH_INDEX_NAME` is absent/empty.
    pub fn from_env() -> Result<Self, RagSearchError> {
        let endpoint = must_env("AZURE_SEARCH_SERVICE_ENDPOINT")?;
        let api_key = must_env("AZURE_SEARCH_ADMIN_KEY")?;
        let index_name = must_env("AZURE_SEARCH_INDEX_NAME")?;

        let api_version = std::env::var("AZURE_SEARCH_API_VERSION")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        Ok(Self {
            endpoint,
            api_key,
            index_name,
            api_version,
            top_k: DEFAULT_TOP_K,
            retry: RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(30)),
        })
    }
}

/// Fetches a required, non-empty environment variable.
fn must_env(key: &'static str) -> Result<String, RagSearchError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RagSearchError::EnvMissing { key }),
    }
}
