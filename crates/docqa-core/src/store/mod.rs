//! Storage abstraction for docqa.
//!
//! The [`DocumentStore`] trait is the capability handed to the ingestion
//! and query pipelines: they can put, read and delete documents but never
//! touch a global map directly. Swapping the backend (in-memory today) does
//! not change any caller.
//!
//! Implementations must be `Send + Sync` to be shared across request
//! handlers.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{Chunk, Document};

pub use memory::InMemoryStore;

/// Full document response: metadata, body, and chunks.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub title: String,
    pub source_url: Option<String>,
    pub content_type: String,
    pub file_size: u64,
    pub created_at: String,
    pub updated_at: String,
    pub reprocessed: bool,
    pub body: String,
    pub chunks: Vec<ChunkResponse>,
}

/// A single chunk within a [`DocumentResponse`].
#[derive(Debug, Clone, Serialize)]
pub struct ChunkResponse {
    pub index: i64,
    pub text: String,
}

/// Lightweight per-document statistics for listings.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub source_url: Option<String>,
    pub content_type: String,
    pub file_size: u64,
    pub text_length: usize,
    pub chunks_count: usize,
    pub created_at: String,
    pub updated_at: String,
    pub reprocessed: bool,
}

/// Raw metadata of a stored document, without body or chunks.
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub id: String,
    pub title: String,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub updated_at: i64,
}

/// Abstract document repository.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`put_document`](DocumentStore::put_document) | Insert or fully replace a document and its chunks |
/// | [`get_document`](DocumentStore::get_document) | Full document with chunks |
/// | [`get_document_metadata`](DocumentStore::get_document_metadata) | Title and raw timestamps only |
/// | [`document_chunks`](DocumentStore::document_chunks) | Ordered chunk texts of one document |
/// | [`list_documents`](DocumentStore::list_documents) | Summaries of all documents, by ascending id |
/// | [`delete_document`](DocumentStore::delete_document) | Remove a document and its chunks |
/// | [`count_documents`](DocumentStore::count_documents) | Number of stored documents |
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or replace `doc` together with its chunk set.
    ///
    /// Readers never observe the new document with the old chunks or the
    /// other way round.
    async fn put_document(&self, doc: &Document, chunks: &[Chunk]) -> Result<()>;

    async fn get_document(&self, id: &str) -> Result<Option<DocumentResponse>>;

    async fn get_document_metadata(&self, id: &str) -> Result<Option<DocumentMetadata>>;

    /// Chunk texts of a document in chunk order.
    async fn document_chunks(&self, id: &str) -> Result<Option<Vec<String>>>;

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>>;

    /// Returns `true` if a document was removed.
    async fn delete_document(&self, id: &str) -> Result<bool>;

    async fn count_documents(&self) -> Result<usize>;
}

/// Format a Unix timestamp as ISO 8601.
pub fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
