//! Ingestion pipeline: download → extract → chunk → store.
//!
//! A document is always replaced as a whole: the extracted text and its
//! chunk set are handed to [`DocumentStore::put_document`] together, so a
//! failed download or extraction leaves any previous version untouched.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use docqa_core::chunk::{chunk_document, ChunkError};
use docqa_core::models::Document;
use docqa_core::store::{format_ts_iso, DocumentStore};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::extract::{extract_text, ExtractError};
use crate::fetch::{download, FetchError};

const DEFAULT_TITLE: &str = "Unknown Document";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Download(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Body of `POST /ingest`.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
    pub file_url: String,
    pub document_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `POST /documents/{id}/reprocess`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReprocessRequest {
    pub file_url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Raw file contents plus the metadata needed to store them.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub document_id: String,
    pub title: String,
    pub source_url: Option<String>,
    /// Used for format detection when the title has no known extension.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub document_id: String,
    pub title: String,
    pub text_length: usize,
    pub chunks_count: usize,
    pub processed_at: String,
    pub reprocessed: bool,
}

/// Extract, chunk and store `source`.
///
/// When a document with the same id already exists it is replaced and its
/// `created_at` is kept. `reprocess` marks the stored document as
/// reprocessed.
pub async fn ingest_file<S: DocumentStore + ?Sized>(
    store: &S,
    source: SourceFile,
    config: &Config,
    reprocess: bool,
) -> Result<IngestReport, IngestError> {
    let body = extract_text(&source.bytes, &source.title, &source.content_type)?;
    let chunks = chunk_document(&source.document_id, &body, &config.chunk_config())?;

    let now = Utc::now().timestamp();
    let created_at = store
        .get_document_metadata(&source.document_id)
        .await?
        .map(|m| m.created_at)
        .unwrap_or(now);

    let doc = Document {
        id: source.document_id,
        title: source.title,
        source_url: source.source_url,
        content_type: source.content_type,
        file_size: source.bytes.len() as u64,
        body,
        created_at,
        updated_at: now,
        reprocessed: reprocess,
    };
    store.put_document(&doc, &chunks).await?;

    let report = IngestReport {
        text_length: doc.body.chars().count(),
        chunks_count: chunks.len(),
        processed_at: format_ts_iso(now),
        reprocessed: reprocess,
        document_id: doc.id,
        title: doc.title,
    };
    tracing::info!(
        document_id = %report.document_id,
        title = %report.title,
        text_length = report.text_length,
        chunks = report.chunks_count,
        reprocessed = report.reprocessed,
        "document ingested"
    );
    Ok(report)
}

/// Download `request.file_url` and ingest it under `request.document_id`.
pub async fn ingest_url<S: DocumentStore + ?Sized>(
    store: &S,
    request: &IngestRequest,
    config: &Config,
) -> Result<IngestReport, IngestError> {
    let title = request
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    fetch_and_ingest(
        store,
        &request.document_id,
        title,
        &request.file_url,
        config,
        false,
    )
    .await
}

/// Re-download and replace document `document_id`.
///
/// Without an explicit title the stored title is kept, or `Document {id}`
/// when the document is not known yet.
pub async fn reprocess_url<S: DocumentStore + ?Sized>(
    store: &S,
    document_id: &str,
    request: &ReprocessRequest,
    config: &Config,
) -> Result<IngestReport, IngestError> {
    let title = match request.title.clone().filter(|t| !t.trim().is_empty()) {
        Some(title) => title,
        None => store
            .get_document_metadata(document_id)
            .await?
            .map(|m| m.title)
            .unwrap_or_else(|| format!("Document {}", document_id)),
    };
    fetch_and_ingest(store, document_id, title, &request.file_url, config, true).await
}

/// Read a local file as a [`SourceFile`]. The file name serves as both
/// document id and title.
pub fn source_from_path(path: &Path) -> anyhow::Result<SourceFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    Ok(SourceFile {
        document_id: name.clone(),
        title: name,
        source_url: None,
        content_type: String::new(),
        bytes,
    })
}

async fn fetch_and_ingest<S: DocumentStore + ?Sized>(
    store: &S,
    document_id: &str,
    title: String,
    file_url: &str,
    config: &Config,
    reprocess: bool,
) -> Result<IngestReport, IngestError> {
    tracing::info!(document_id, url = file_url, reprocess, "downloading document");
    let downloaded = download(file_url, &config.ingest).await?;
    let source = SourceFile {
        document_id: document_id.to_string(),
        title,
        source_url: Some(file_url.to_string()),
        content_type: downloaded.content_type,
        bytes: downloaded.bytes,
    };
    ingest_file(store, source, config, reprocess).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::store::InMemoryStore;

    fn txt(id: &str, title: &str, body: &str) -> SourceFile {
        SourceFile {
            document_id: id.to_string(),
            title: title.to_string(),
            source_url: None,
            content_type: "text/plain".to_string(),
            bytes: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn ingests_text_file() {
        let store = InMemoryStore::new();
        let report = ingest_file(
            &store,
            txt("d1", "notes.txt", "  The procedure is simple.  "),
            &Config::default(),
            false,
        )
        .await
        .unwrap();

        assert_eq!(report.document_id, "d1");
        assert_eq!(report.text_length, 24);
        assert_eq!(report.chunks_count, 1);
        assert!(!report.reprocessed);

        let doc = store.get_document("d1").await.unwrap().unwrap();
        assert_eq!(doc.body, "The procedure is simple.");
        assert_eq!(doc.file_size, 28);
    }

    #[tokio::test]
    async fn reprocess_keeps_created_at() {
        let store = InMemoryStore::new();
        let config = Config::default();
        ingest_file(&store, txt("d1", "a.txt", "old text"), &config, false)
            .await
            .unwrap();
        let before = store.get_document_metadata("d1").await.unwrap().unwrap();

        let report = ingest_file(&store, txt("d1", "a.txt", "new text"), &config, true)
            .await
            .unwrap();
        assert!(report.reprocessed);

        let after = store.get_document("d1").await.unwrap().unwrap();
        assert_eq!(after.body, "new text");
        assert!(after.reprocessed);
        assert_eq!(after.created_at, format_ts_iso(before.created_at));
    }

    #[tokio::test]
    async fn empty_file_is_an_extraction_error_and_stores_nothing() {
        let store = InMemoryStore::new();
        let err = ingest_file(&store, txt("d1", "a.txt", "   "), &Config::default(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Extract(ExtractError::Empty)));
        assert_eq!(store.count_documents().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_reprocess_keeps_previous_version() {
        let store = InMemoryStore::new();
        let config = Config::default();
        ingest_file(&store, txt("d1", "a.txt", "kept text"), &config, false)
            .await
            .unwrap();

        let mut broken = txt("d1", "a.pdf", "not a pdf");
        broken.content_type = "application/pdf".to_string();
        let err = ingest_file(&store, broken, &config, true).await.unwrap_err();
        assert!(matches!(err, IngestError::Extract(ExtractError::Pdf(_))));

        let doc = store.get_document("d1").await.unwrap().unwrap();
        assert_eq!(doc.body, "kept text");
        assert!(!doc.reprocessed);
    }

    #[test]
    fn source_from_path_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.txt");
        std::fs::write(&path, "hello").unwrap();

        let source = source_from_path(&path).unwrap();
        assert_eq!(source.document_id, "guide.txt");
        assert_eq!(source.title, "guide.txt");
        assert_eq!(source.bytes, b"hello");
        assert!(source_from_path(&dir.path().join("missing.txt")).is_err());
    }

    #[tokio::test]
    async fn bad_url_is_a_download_error() {
        let store = InMemoryStore::new();
        let request = IngestRequest {
            file_url: "ftp://example.com/a.txt".to_string(),
            document_id: "d1".to_string(),
            title: None,
        };
        let err = ingest_url(&store, &request, &Config::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Download(FetchError::InvalidUrl { .. })));
    }
}
