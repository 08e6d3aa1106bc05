//! Index schema management and bulk document upload.
//!
//! REST surface:
//! - PUT  {endpoint}/indexes/{name}?api-version={v}            — create/update schema
//! - POST {endpoint}/indexes/{name}/docs/index?api-version={v} — batch upload
//!
//! Documents come from local JSON files: top-level metadata fields are mapped
//! directly, the nested `content` value is flattened into `content_text`.

use std::path::Path;
use std::time::Duration;

use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, info};

use crate::config::DEFAULT_API_VERSION;
use crate::errors::rag_search_error::{RagSearchError, make_snippet};
use crate::flatten::flatten_to_text;

const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Admin client for one search index.
#[derive(Debug)]
pub struct IndexAdmin {
    client: reqwest::Client,
    index_name: String,
    url_index: String,
    url_upload: String,
}

impl IndexAdmin {
    /// Creates an admin client for `index_name` on `endpoint`.
    ///
    /// # Errors
    /// - [`RagSearchError::InvalidConfig`] for a non-HTTP endpoint or bad key
    /// - [`RagSearchError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(endpoint: &str, api_key: &str, index_name: &str) -> Result<Self, RagSearchError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(RagSearchError::InvalidConfig(format!(
                "endpoint must start with http:// or https://, got '{endpoint}'"
            )));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "api-key",
            header::HeaderValue::from_str(api_key).map_err(|e| {
                RagSearchError::InvalidConfig(format!("invalid api key header: {e}"))
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_index = format!(
            "{}/indexes/{}?api-version={}",
            base, index_name, DEFAULT_API_VERSION
        );
        let url_upload = format!(
            "{}/indexes/{}/docs/index?api-version={}",
            base, index_name, DEFAULT_API_VERSION
        );

        info!(endpoint = %endpoint, index = %index_name, "IndexAdmin initialized");

        Ok(Self {
            client,
            index_name: index_name.to_string(),
            url_index,
            url_upload,
        })
    }

    /// Creates the index, or updates it in place when it already exists.
    pub async fn create_or_update_index(&self) -> Result<(), RagSearchError> {
        let schema = index_schema(&self.index_name);
        debug!(index = %self.index_name, "PUT {}", self.url_index);

        let resp = self.client.put(&self.url_index).json(&schema).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_index.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(%status, %url, %snippet, "index create/update failed");
            return Err(RagSearchError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        info!(index = %self.index_name, "index created/updated");
        Ok(())
    }

    /// Uploads a document batch and reports per-document outcomes.
    pub async fn upload_documents(
        &self,
        docs: &[IndexDocument],
    ) -> Result<UploadReport, RagSearchError> {
        if docs.is_empty() {
            return Ok(UploadReport::default());
        }

        let body = json!({ "value": docs });
        debug!(index = %self.index_name, count = docs.len(), "POST {}", self.url_upload);

        let resp = self.client.post(&self.url_upload).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_upload.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(%status, %url, %snippet, "document upload failed");
            return Err(RagSearchError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        let out: IndexBatchResponse = resp.json().await.map_err(|e| {
            RagSearchError::Decode(format!("serde error: {e}; expected `value[]` results"))
        })?;

        let mut report = UploadReport {
            total: out.value.len(),
            ..UploadReport::default()
        };
        for result in out.value {
            if result.status {
                report.succeeded += 1;
            } else {
                report.failures.push((
                    result.key.unwrap_or_else(|| "<unknown>".to_string()),
                    result
                        .error_message
                        .unwrap_or_else(|| "no error message".to_string()),
                ));
            }
        }

        info!(
            index = %self.index_name,
            succeeded = report.succeeded,
            total = report.total,
            "document upload completed"
        );
        Ok(report)
    }
}

/// The fixed field schema for the career-document index.
pub fn index_schema(index_name: &str) -> Value {
    json!({
        "name": index_name,
        "fields": [
            { "name": "document_id", "type": "Edm.String", "key": true,
              "sortable": true, "filterable": true, "facetable": true },
            { "name": "title", "type": "Edm.String", "searchable": true,
              "sortable": true, "filterable": true, "facetable": true },
            { "name": "content_text", "type": "Edm.String", "searchable": true },
            { "name": "provider", "type": "Edm.String", "searchable": true,
              "filterable": true, "facetable": true, "sortable": true },
            { "name": "department", "type": "Edm.String", "searchable": true,
              "filterable": true, "facetable": true, "sortable": true },
            { "name": "company", "type": "Edm.String",
              "filterable": true, "facetable": true, "sortable": true },
            { "name": "last_updated", "type": "Edm.DateTimeOffset",
              "sortable": true, "filterable": true }
        ]
    })
}

/// Reads one JSON file and maps it to an uploadable document.
pub fn prepare_document(path: &Path) -> Result<IndexDocument, RagSearchError> {
    let raw = std::fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&raw)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    Ok(document_from_value(stem, &data))
}

/// Maps parsed JSON to an [`IndexDocument`].
///
/// `document_id` falls back to the sanitized file stem (dots replaced with
/// underscores); `company` defaults to "Contoso"; empty `last_updated` is
/// dropped so the service does not reject the batch.
pub fn document_from_value(file_stem: &str, data: &Value) -> IndexDocument {
    let sanitized_id = file_stem.replace('.', "_");

    let str_field = |key: &str| -> String {
        data.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let content_text = data
        .get("content")
        .map(flatten_to_text)
        .unwrap_or_default();

    let company = {
        let c = str_field("company");
        if c.is_empty() { "Contoso".to_string() } else { c }
    };

    IndexDocument {
        action: "upload",
        document_id: data
            .get("document_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(sanitized_id),
        title: str_field("title"),
        content_text,
        provider: str_field("provider"),
        department: str_field("department"),
        company,
        last_updated: data
            .get("last_updated")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }
}

/// One document in the upload batch.
#[derive(Debug, Serialize)]
pub struct IndexDocument {
    #[serde(rename = "@search.action")]
    pub action: &'static str,
    pub document_id: String,
    pub title: String,
    pub content_text: String,
    pub provider: String,
    pub department: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Outcome summary for one upload batch.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub succeeded: usize,
    pub total: usize,
    /// `(document key, error message)` for each rejected document.
    pub failures: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct IndexBatchResponse {
    value: Vec<IndexingResult>,
}

#[derive(Debug, Deserialize)]
struct IndexingResult {
    key: Option<String>,
    status: bool,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn schema_marks_document_id_as_key() {
        let schema = index_schema("career-docs");
        assert_eq!(schema["name"], "career-docs");
        let key_field = schema["fields"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["key"] == json!(true))
            .unwrap();
        assert_eq!(key_field["name"], "document_id");
    }

    #[test]
    fn document_id_falls_back_to_sanitized_stem() {
        let doc = document_from_value("career.ladder.v2", &json!({"title": "Ladder"}));
        assert_eq!(doc.document_id, "career_ladder_v2");
        assert_eq!(doc.title, "Ladder");
        assert_eq!(doc.company, "Contoso");
        assert_eq!(doc.action, "upload");
    }

    #[test]
    fn content_is_flattened_into_content_text() {
        let doc = document_from_value(
            "plan",
            &json!({"document_id": "p1", "content": {"goal": "lead", "skills": ["sql"]}}),
        );
        assert_eq!(doc.document_id, "p1");
        assert_eq!(doc.content_text, "goal: lead skills_0: sql");
    }

    #[test]
    fn empty_last_updated_is_dropped_from_payload() {
        let doc = document_from_value("d", &json!({"last_updated": ""}));
        assert!(doc.last_updated.is_none());
        let payload = serde_json::to_value(&doc).unwrap();
        assert!(payload.get("last_updated").is_none());
        assert_eq!(payload["@search.action"], "upload");
    }
}
