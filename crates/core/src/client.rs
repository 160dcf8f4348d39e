use async_trait::async_trait;

use crate::error::StoreError;

/// A raw response from the document store: status code plus body bytes.
/// Decoding into typed results happens in the `response` module.
#[derive(Debug, Clone)]
pub struct StoreResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl StoreResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Aggregate outcome of a bulk indexing run. Bulk semantics are
/// best-effort: individual item failures are counted, not fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub indexed: usize,
    pub failed: usize,
}

/// Byte-in/byte-out access to the document store.
///
/// Implementations own the transport; they never interpret response
/// bodies beyond returning them. Connection management, retries and
/// timeouts live behind this seam.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Runs a serialized search query against the index.
    async fn search(&self, query: &[u8]) -> Result<StoreResponse, StoreError>;

    /// Fetches a single document by id.
    async fn get(&self, id: &str) -> Result<StoreResponse, StoreError>;

    /// Indexes a new document and lets the store assign its id.
    async fn index(&self, document: &[u8]) -> Result<StoreResponse, StoreError>;

    /// Applies a partial document to an existing one.
    async fn update(&self, id: &str, document: &[u8]) -> Result<StoreResponse, StoreError>;

    /// Removes a document by id.
    async fn delete(&self, id: &str) -> Result<StoreResponse, StoreError>;

    /// Indexes many documents at once, continuing past per-item failures.
    async fn bulk_index(&self, documents: &[Vec<u8>]) -> Result<BulkReport, StoreError>;
}
