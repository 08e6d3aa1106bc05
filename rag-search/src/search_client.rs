//! Thin client for the search service's document-query REST surface.
//!
//! Single endpoint:
//! - POST {endpoint}/indexes/{index}/docs/search?api-version={v}
//!
//! Constructor validation:
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Errors are normalized via [`RagSearchError`].

use std::time::Duration;

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::SearchConfig;
use crate::errors::rag_search_error::{RagSearchError, make_snippet};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Preconfigured HTTP client bound to one search index.
#[derive(Debug)]
pub struct SearchBackend {
    client: reqwest::Client,
    cfg: SearchConfig,
    url_search: String,
}

impl SearchBackend {
    /// Creates a new [`SearchBackend`] from the given config.
    ///
    /// Builds an HTTP client with the `api-key` default header and a request
    /// timeout.
    ///
    /// # Errors
    /// - [`RagSearchError::InvalidConfig`] if the endpoint scheme is invalid
    /// - [`RagSearchError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: SearchConfig) -> Result<Self, RagSearchError> {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(RagSearchError::InvalidConfig(format!(
                "search endpoint must start with http:// or https://, got '{}'",
                cfg.endpoint
            )));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "api-key",
            header::HeaderValue::from_str(&cfg.api_key).map_err(|e| {
                RagSearchError::InvalidConfig(format!("invalid api key header: {e}"))
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_search = format!(
            "{}/indexes/{}/docs/search?api-version={}",
            base, cfg.index_name, cfg.api_version
        );

        info!(
            endpoint = %cfg.endpoint,
            index = %cfg.index_name,
            api_version = %cfg.api_version,
            "SearchBackend initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_search,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.cfg
    }

    /// Runs a single full-text query and returns documents in provider order.
    ///
    /// # Errors
    /// - [`RagSearchError::HttpStatus`] for non-2xx responses
    /// - [`RagSearchError::HttpTransport`] for client/network failures
    /// - [`RagSearchError::Decode`] if the JSON cannot be parsed
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchDoc>, RagSearchError> {
        let body = SearchRequest {
            search: query,
            top: top_k,
        };

        debug!(
            index = %self.cfg.index_name,
            top = top_k,
            query_len = query.len(),
            "POST {}", self.url_search
        );

        let resp = self
            .client
            .post(&self.url_search)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_search.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                index = %self.cfg.index_name,
                "search query returned non-success status"
            );

            return Err(RagSearchError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        let out: SearchResponse = resp.json().await.map_err(|e| {
            error!(error = %e, index = %self.cfg.index_name, "failed to decode search response");
            RagSearchError::Decode(format!("serde error: {e}; expected `value[]` documents"))
        })?;

        Ok(out.value)
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for the docs/search call.
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
    top: usize,
}

/// One indexed document as returned by the search service.
///
/// All fields are optional: the retriever substitutes fixed defaults for
/// anything absent.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchDoc {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    value: Vec<SearchDoc>,
}
