//! Elasticsearch/OpenSearch-compatible implementation of [`DocumentStore`]
//! over plain HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::value::RawValue;

use crate::client::{BulkReport, DocumentStore, StoreResponse};
use crate::error::StoreError;

pub struct ElasticsearchStore {
    client: Arc<Client>,
    endpoint: String,
    index_name: String,
}

impl ElasticsearchStore {
    pub fn new(endpoint: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            endpoint: endpoint.into(),
            index_name: index_name.into(),
        }
    }

    /// Creates the book index with its mapping when it does not exist yet.
    pub async fn ensure_index(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .head(format!("{}/{}", self.endpoint, self.index_name))
            .send()
            .await?;

        if response.status() == StatusCode::OK {
            return Ok(());
        }

        if !response.status().is_client_error() {
            return Err(StoreError::Unhandled(format!(
                "index lookup failed with {}",
                response.status()
            )));
        }

        let response = self
            .client
            .put(format!("{}/{}", self.endpoint, self.index_name))
            .json(&json!({
                "mappings": {
                    "properties": {
                        "id": {"type": "keyword"},
                        "created_at": {"type": "date"},
                        "title": {"type": "text", "analyzer": "english"},
                        "abstract": {"type": "text", "analyzer": "english"},
                        "author": {
                            "properties": {
                                "firstname": {"type": "keyword"},
                                "lastname": {"type": "keyword"}
                            }
                        }
                    }
                }
            }))
            .send()
            .await?;

        if response.status().is_client_error() || response.status().is_server_error() {
            return Err(StoreError::Unhandled(format!(
                "index setup failed with {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn into_store_response(response: reqwest::Response) -> Result<StoreResponse, StoreError> {
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(StoreResponse { status, body })
    }
}

// The store expects partial updates wrapped in a "doc" object.
#[derive(Serialize)]
struct UpdateEnvelope<'a> {
    doc: &'a RawValue,
}

fn update_payload(document: &[u8]) -> Result<Vec<u8>, StoreError> {
    let text = std::str::from_utf8(document)
        .map_err(|_| StoreError::Malformed("update document is not valid UTF-8".to_string()))?;
    let doc: &RawValue = serde_json::from_str(text)?;
    Ok(serde_json::to_vec(&UpdateEnvelope { doc })?)
}

// One action line plus one source line per document, newline-terminated.
fn bulk_payload(index_name: &str, documents: &[Vec<u8>]) -> Result<String, StoreError> {
    let mut payload = String::new();
    for document in documents {
        let action = serde_json::to_string(&json!({"index": {"_index": index_name}}))?;
        let source = std::str::from_utf8(document)
            .map_err(|_| StoreError::Malformed("bulk document is not valid UTF-8".to_string()))?;
        payload.push_str(&action);
        payload.push('\n');
        payload.push_str(source.trim());
        payload.push('\n');
    }
    Ok(payload)
}

#[derive(Debug, Default, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    items: Vec<BulkItem>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(default)]
    index: BulkItemStatus,
}

#[derive(Debug, Default, Deserialize)]
struct BulkItemStatus {
    #[serde(default)]
    status: u16,
}

fn bulk_report(raw: &[u8]) -> Result<BulkReport, StoreError> {
    let response: BulkResponse = serde_json::from_slice(raw)?;

    let mut report = BulkReport::default();
    for item in response.items {
        if (200..300).contains(&item.index.status) {
            report.indexed += 1;
        } else {
            report.failed += 1;
        }
    }
    Ok(report)
}

#[async_trait]
impl DocumentStore for ElasticsearchStore {
    async fn search(&self, query: &[u8]) -> Result<StoreResponse, StoreError> {
        let response = self
            .client
            .post(format!(
                "{}/{}/_search?track_total_hits=true",
                self.endpoint, self.index_name
            ))
            .header("Content-Type", "application/json")
            .body(query.to_vec())
            .send()
            .await?;

        Self::into_store_response(response).await
    }

    async fn get(&self, id: &str) -> Result<StoreResponse, StoreError> {
        let response = self
            .client
            .get(format!("{}/{}/_doc/{}", self.endpoint, self.index_name, id))
            .send()
            .await?;

        Self::into_store_response(response).await
    }

    async fn index(&self, document: &[u8]) -> Result<StoreResponse, StoreError> {
        let response = self
            .client
            .post(format!("{}/{}/_doc", self.endpoint, self.index_name))
            .header("Content-Type", "application/json")
            .body(document.to_vec())
            .send()
            .await?;

        Self::into_store_response(response).await
    }

    async fn update(&self, id: &str, document: &[u8]) -> Result<StoreResponse, StoreError> {
        let payload = update_payload(document)?;

        let response = self
            .client
            .post(format!(
                "{}/{}/_update/{}",
                self.endpoint, self.index_name, id
            ))
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await?;

        Self::into_store_response(response).await
    }

    async fn delete(&self, id: &str) -> Result<StoreResponse, StoreError> {
        let response = self
            .client
            .delete(format!("{}/{}/_doc/{}", self.endpoint, self.index_name, id))
            .send()
            .await?;

        Self::into_store_response(response).await
    }

    async fn bulk_index(&self, documents: &[Vec<u8>]) -> Result<BulkReport, StoreError> {
        if documents.is_empty() {
            return Ok(BulkReport::default());
        }

        let payload = bulk_payload(&self.index_name, documents)?;

        let response = self
            .client
            .post(format!("{}/_bulk", self.endpoint))
            .header("Content-Type", "application/x-ndjson")
            .body(payload)
            .send()
            .await?;

        let response = Self::into_store_response(response).await?;
        if !response.is_success() {
            return Err(StoreError::Unhandled(format!(
                "bulk indexing failed with status {}",
                response.status
            )));
        }

        bulk_report(&response.body)
    }
}
