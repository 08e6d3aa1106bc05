//! Dependency health snapshots for the `/health` endpoint.
//!
//! Health is computed, never cached: each call re-derives the snapshot from
//! the configuration state captured at startup. The optional reachability
//! probe resolves the endpoint hostname only; it never performs an API call,
//! so a reachable-but-unauthorized dependency still reads as reachable.

use serde::Serialize;
use tracing::{debug, warn};

/// A serializable health snapshot for a single external dependency.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyHealth {
    /// Whether the dependency's configuration was present at startup.
    pub configured: bool,
    /// "healthy" when the client handle was constructed, "degraded" otherwise.
    pub status: &'static str,
    /// DNS-probe outcome; absent unless the caller requested a probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
}

impl DependencyHealth {
    pub fn new(configured: bool, constructed: bool) -> Self {
        Self {
            configured,
            status: if constructed { "healthy" } else { "degraded" },
            reachable: None,
        }
    }
}

/// Resolves the endpoint's hostname without touching the API.
///
/// Returns `false` for unparseable endpoints or failed resolution; this is a
/// diagnostic signal, not an error path.
pub async fn endpoint_resolves(endpoint: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(endpoint) else {
        warn!(endpoint, "reachability probe skipped: endpoint is not a valid URL");
        return false;
    };
    let Some(host) = url.host_str() else {
        warn!(endpoint, "reachability probe skipped: endpoint has no host");
        return false;
    };
    let port = url.port_or_known_default().unwrap_or(443);

    match tokio::net::lookup_host((host, port)).await {
        Ok(mut addrs) => {
            let resolved = addrs.next().is_some();
            debug!(host, port, resolved, "reachability probe finished");
            resolved
        }
        Err(e) => {
            warn!(host, port, error = %e, "hostname resolution failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_and_constructed_reads_healthy() {
        let health = DependencyHealth::new(true, true);
        assert!(health.configured);
        assert_eq!(health.status, "healthy");
        assert!(health.reachable.is_none());
    }

    #[test]
    fn construction_failure_reads_degraded() {
        let health = DependencyHealth::new(true, false);
        assert_eq!(health.status, "degraded");
    }

    #[test]
    fn reachable_field_is_omitted_unless_probed() {
        let json = serde_json::to_value(DependencyHealth::new(false, false)).unwrap();
        assert!(json.get("reachable").is_none());
        assert_eq!(json["status"], "degraded");
    }

    #[tokio::test]
    async fn localhost_endpoint_resolves() {
        assert!(endpoint_resolves("http://localhost:8080").await);
    }

    #[tokio::test]
    async fn garbage_endpoint_does_not_resolve() {
        assert!(!endpoint_resolves("not a url").await);
    }
}
