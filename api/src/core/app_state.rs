//! Shared state for all HTTP handlers, built once at process start.
//!
//! Missing configuration degrades the affected dependency instead of
//! crashing: the handle stays `None`, the first problem is retained as a
//! warning, and the process keeps serving whatever still works.

use ai_completion_service::{AzureOpenAiService, CompletionConfig};
use rag_search::{DocumentRetriever, SearchBackend, SearchConfig};
use tracing::{error, info, warn};

/// Environment variables surfaced by the diagnostics endpoints, in report
/// order. Anything whose name contains `KEY` is excluded from responses.
const ENV_KEYS: [&str; 7] = [
    "AZURE_OPENAI_ENDPOINT",
    "AZURE_OPENAI_API_KEY",
    "AZURE_OPENAI_DEPLOYMENT_NAME",
    "AZURE_OPENAI_API_VERSION",
    "AZURE_SEARCH_SERVICE_ENDPOINT",
    "AZURE_SEARCH_ADMIN_KEY",
    "AZURE_SEARCH_INDEX_NAME",
];

/// Presence snapshot of the configuration variables, captured at startup.
#[derive(Debug, Clone)]
pub struct EnvReport {
    entries: Vec<(&'static str, bool)>,
}

impl EnvReport {
    /// Captures which configuration variables are set (non-empty).
    pub fn capture() -> Self {
        let entries = ENV_KEYS
            .iter()
            .map(|key| {
                let set = std::env::var(key).is_ok_and(|v| !v.is_empty());
                (*key, set)
            })
            .collect();
        Self { entries }
    }

    /// Non-secret presence map for response bodies. Variables whose name
    /// contains `KEY` are omitted entirely, not just masked.
    pub fn presence_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.entries
            .iter()
            .filter(|(key, _)| !key.contains("KEY"))
            .map(|(key, set)| {
                let status = if *set { "SET" } else { "NOT SET" };
                (key.to_string(), serde_json::Value::from(status))
            })
            .collect()
    }

    fn log(&self) {
        info!("environment variables status:");
        for (key, set) in &self.entries {
            info!("  {}: {}", key, if *set { "SET" } else { "NOT SET" });
        }
    }
}

/// Shared state for all HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    /// Completion client; `None` when unconfigured or construction failed.
    pub completion: Option<AzureOpenAiService>,
    /// Whether completion configuration was present at startup.
    pub completion_configured: bool,
    /// Completion endpoint, retained for the reachability probe.
    pub completion_endpoint: Option<String>,

    /// Retrieval front-end; degrades to sentinels when unconfigured.
    pub retriever: DocumentRetriever,
    /// Whether search configuration was present at startup.
    pub search_configured: bool,
    /// Search endpoint, retained for the reachability probe.
    pub search_endpoint: Option<String>,

    /// Startup snapshot for the diagnostics endpoints.
    pub env_report: EnvReport,
    /// First initialization problem, surfaced by `/` and `/health`.
    pub init_warning: Option<String>,
    /// Hosting instance id, `"unknown"` outside the managed platform.
    pub instance_id: String,
}

impl AppState {
    /// Loads shared state from environment variables.
    pub fn from_env() -> Self {
        let env_report = EnvReport::capture();
        env_report.log();

        let mut init_warning: Option<String> = None;

        let (completion, completion_configured, completion_endpoint) =
            match CompletionConfig::from_env() {
                Ok(cfg) => {
                    let endpoint = cfg.endpoint.clone();
                    match AzureOpenAiService::new(cfg) {
                        Ok(service) => (Some(service), true, Some(endpoint)),
                        Err(e) => {
                            error!(error = %e, "completion client initialization failed");
                            init_warning
                                .get_or_insert(format!("completion client initialization error: {e}"));
                            (None, true, Some(endpoint))
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "completion configuration missing");
                    init_warning.get_or_insert(format!("completion configuration missing: {e}"));
                    (None, false, None)
                }
            };

        let (retriever, search_configured, search_endpoint) = match SearchConfig::from_env() {
            Ok(cfg) => {
                let endpoint = cfg.endpoint.clone();
                match SearchBackend::new(cfg) {
                    Ok(backend) => (DocumentRetriever::new(Some(backend)), true, Some(endpoint)),
                    Err(e) => {
                        error!(error = %e, "search client initialization failed");
                        init_warning
                            .get_or_insert(format!("search client initialization error: {e}"));
                        (DocumentRetriever::unconfigured(), true, Some(endpoint))
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "search configuration missing, RAG features disabled");
                init_warning.get_or_insert(format!(
                    "search configuration missing: {e}. RAG features will be disabled."
                ));
                (DocumentRetriever::unconfigured(), false, None)
            }
        };

        Self {
            completion,
            completion_configured,
            completion_endpoint,
            retriever,
            search_configured,
            search_endpoint,
            env_report,
            init_warning,
            instance_id: std::env::var("WEBSITE_INSTANCE_ID")
                .unwrap_or_else(|_| "unknown".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_map_never_contains_key_variables() {
        let report = EnvReport::capture();
        let map = report.presence_map();
        assert!(!map.contains_key("AZURE_OPENAI_API_KEY"));
        assert!(!map.contains_key("AZURE_SEARCH_ADMIN_KEY"));
        assert!(map.contains_key("AZURE_OPENAI_ENDPOINT"));
        for value in map.values() {
            let v = value.as_str().unwrap();
            assert!(v == "SET" || v == "NOT SET");
        }
    }
}
