//! Context retrieval for the RAG pipeline.
//!
//! [`DocumentRetriever::retrieve_context`] never fails: every degraded state
//! (search not configured, retries exhausted, zero hits) maps to a fixed
//! sentinel string so the caller can always assemble a prompt.

use retry_policy::run_with_retry;
use tracing::{error, info, warn};

use crate::search_client::{SearchBackend, SearchDoc};

/// Header line for a non-empty context block.
pub const CONTEXT_HEADER: &str = "\n\nRelevant Context from Contoso Documents:\n";

/// Returned when the search dependency was never configured.
pub const SENTINEL_NOT_CONFIGURED: &str = "\nSearch functionality is not configured.\n";

/// Returned when the query matched no documents.
pub const SENTINEL_NO_DOCUMENTS: &str = "\nNo specific documents found for the query.\n";

/// Returned when the search call failed after retries.
pub const SENTINEL_RETRIEVAL_ERROR: &str = "\nError retrieving documents from search index.\n";

/// Hard cap on snippet content, in characters.
const SNIPPET_MAX_CHARS: usize = 500;

/// Retrieval front-end over an optional [`SearchBackend`].
#[derive(Debug)]
pub struct DocumentRetriever {
    backend: Option<SearchBackend>,
}

impl DocumentRetriever {
    pub fn new(backend: Option<SearchBackend>) -> Self {
        Self { backend }
    }

    /// A retriever without a search dependency; always returns the
    /// not-configured sentinel.
    pub fn unconfigured() -> Self {
        Self { backend: None }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Queries the search index and renders the snippets into one text block.
    ///
    /// `top_k` falls back to the configured default when `None`. Search
    /// failures are absorbed: they are logged and replaced by
    /// [`SENTINEL_RETRIEVAL_ERROR`].
    pub async fn retrieve_context(&self, query: &str, top_k: Option<usize>) -> String {
        let Some(backend) = &self.backend else {
            warn!("search client not available, skipping document retrieval");
            return SENTINEL_NOT_CONFIGURED.to_string();
        };

        let top = top_k.unwrap_or(backend.config().top_k);
        let policy = backend.config().retry;

        info!(top, query_len = query.len(), "performing search");

        match run_with_retry(&policy, "search_documents", || backend.search(query, top)).await {
            Ok(docs) => {
                info!(hits = docs.len(), "retrieval finished");
                format_context(&docs)
            }
            Err(err) => {
                error!(error = %err, "search query failed, falling back to error sentinel");
                SENTINEL_RETRIEVAL_ERROR.to_string()
            }
        }
    }
}

/// Renders retrieved documents into the fixed context block.
///
/// Documents keep provider order. Content is truncated to 500 characters
/// with a `"..."` suffix; absent fields get fixed placeholders.
pub fn format_context(docs: &[SearchDoc]) -> String {
    if docs.is_empty() {
        return SENTINEL_NO_DOCUMENTS.to_string();
    }

    let mut context = String::from(CONTEXT_HEADER);
    for (i, doc) in docs.iter().enumerate() {
        let id = doc.document_id.as_deref().unwrap_or("N/A");
        let title = doc.title.as_deref().unwrap_or("N/A");
        let content = doc.content_text.as_deref().unwrap_or("No content available.");

        context.push_str(&format!(
            "\n--- Document {} (ID: {}, Title: {}) ---\n",
            i + 1,
            id,
            title
        ));
        context.push_str(truncate_chars(content, SNIPPET_MAX_CHARS));
        context.push_str("...\n");
    }
    context
}

/// Truncates to at most `max` characters on a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use retry_policy::RetryPolicy;

    use crate::config::SearchConfig;

    fn doc(id: &str, title: &str, content: &str) -> SearchDoc {
        SearchDoc {
            document_id: Some(id.to_string()),
            title: Some(title.to_string()),
            content_text: Some(content.to_string()),
        }
    }

    #[test]
    fn empty_results_yield_no_documents_sentinel() {
        assert_eq!(format_context(&[]), SENTINEL_NO_DOCUMENTS);
    }

    #[test]
    fn snippets_keep_order_and_numbering() {
        let ctx = format_context(&[
            doc("a1", "First", "alpha"),
            doc("b2", "Second", "beta"),
        ]);
        assert!(ctx.starts_with(CONTEXT_HEADER));
        assert!(ctx.contains("--- Document 1 (ID: a1, Title: First) ---"));
        assert!(ctx.contains("--- Document 2 (ID: b2, Title: Second) ---"));
        let first = ctx.find("alpha").unwrap();
        let second = ctx.find("beta").unwrap();
        assert!(first < second);
    }

    #[test]
    fn long_content_is_cut_at_500_chars_plus_ellipsis() {
        let long = "x".repeat(700);
        let ctx = format_context(&[doc("d", "T", &long)]);
        let expected = format!("{}...", "x".repeat(500));
        assert!(ctx.contains(&expected));
        assert!(!ctx.contains(&"x".repeat(501)));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(600);
        let ctx = format_context(&[doc("d", "T", &long)]);
        assert!(ctx.contains(&format!("{}...", "é".repeat(500))));
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let bare = SearchDoc {
            document_id: None,
            title: None,
            content_text: None,
        };
        let ctx = format_context(&[bare]);
        assert!(ctx.contains("(ID: N/A, Title: N/A)"));
        assert!(ctx.contains("No content available...."));
    }

    #[tokio::test]
    async fn unconfigured_retriever_returns_sentinel() {
        let retriever = DocumentRetriever::unconfigured();
        let ctx = retriever.retrieve_context("anything", None).await;
        assert_eq!(ctx, SENTINEL_NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn failing_backend_never_raises() {
        // Nothing listens on this port; every attempt fails with a
        // connection error, which the retriever must absorb.
        let cfg = SearchConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key: "test-key".to_string(),
            index_name: "docs".to_string(),
            api_version: "2023-11-01".to_string(),
            top_k: 3,
            retry: RetryPolicy::new(1, Duration::from_millis(1), Duration::from_millis(2)),
        };
        let retriever = DocumentRetriever::new(Some(SearchBackend::new(cfg).unwrap()));
        let ctx = retriever.retrieve_context("anything", None).await;
        assert_eq!(ctx, SENTINEL_RETRIEVAL_ERROR);
    }
}
