//! In-memory [`DocumentStore`] implementation.
//!
//! Documents and their chunk sets live together in one `BTreeMap` behind a
//! `std::sync::RwLock`, so a put replaces both under a single write lock and
//! listings come out in ascending id order. State is lost when the process
//! exits.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Chunk, Document};

use super::{
    format_ts_iso, ChunkResponse, DocumentMetadata, DocumentResponse, DocumentStore,
    DocumentSummary,
};

struct StoredDoc {
    doc: Document,
    chunks: Vec<Chunk>,
}

impl StoredDoc {
    fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.doc.id.clone(),
            title: self.doc.title.clone(),
            source_url: self.doc.source_url.clone(),
            content_type: self.doc.content_type.clone(),
            file_size: self.doc.file_size,
            text_length: self.doc.body.chars().count(),
            chunks_count: self.chunks.len(),
            created_at: format_ts_iso(self.doc.created_at),
            updated_at: format_ts_iso(self.doc.updated_at),
            reprocessed: self.doc.reprocessed,
        }
    }
}

/// In-memory store, shared between handlers behind an `Arc`.
pub struct InMemoryStore {
    docs: RwLock<BTreeMap<String, StoredDoc>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, StoredDoc>>> {
        self.docs
            .read()
            .map_err(|_| anyhow!("document store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, StoredDoc>>> {
        self.docs
            .write()
            .map_err(|_| anyhow!("document store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn put_document(&self, doc: &Document, chunks: &[Chunk]) -> Result<()> {
        let mut chunks = chunks.to_vec();
        chunks.sort_by_key(|c| c.chunk_index);
        self.write()?.insert(
            doc.id.clone(),
            StoredDoc {
                doc: doc.clone(),
                chunks,
            },
        );
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<DocumentResponse>> {
        let docs = self.read()?;
        let stored = match docs.get(id) {
            Some(s) => s,
            None => return Ok(None),
        };

        Ok(Some(DocumentResponse {
            id: stored.doc.id.clone(),
            title: stored.doc.title.clone(),
            source_url: stored.doc.source_url.clone(),
            content_type: stored.doc.content_type.clone(),
            file_size: stored.doc.file_size,
            created_at: format_ts_iso(stored.doc.created_at),
            updated_at: format_ts_iso(stored.doc.updated_at),
            reprocessed: stored.doc.reprocessed,
            body: stored.doc.body.clone(),
            chunks: stored
                .chunks
                .iter()
                .map(|c| ChunkResponse {
                    index: c.chunk_index,
                    text: c.text.clone(),
                })
                .collect(),
        }))
    }

    async fn get_document_metadata(&self, id: &str) -> Result<Option<DocumentMetadata>> {
        Ok(self.read()?.get(id).map(|s| DocumentMetadata {
            id: s.doc.id.clone(),
            title: s.doc.title.clone(),
            created_at: s.doc.created_at,
            updated_at: s.doc.updated_at,
        }))
    }

    async fn document_chunks(&self, id: &str) -> Result<Option<Vec<String>>> {
        Ok(self
            .read()?
            .get(id)
            .map(|s| s.chunks.iter().map(|c| c.text.clone()).collect()))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        Ok(self.read()?.values().map(StoredDoc::summary).collect())
    }

    async fn delete_document(&self, id: &str) -> Result<bool> {
        Ok(self.write()?.remove(id).is_some())
    }

    async fn count_documents(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
