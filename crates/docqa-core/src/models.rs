//! Core data models shared by the ingestion and query pipelines.
//!
//! A [`Document`] owns the text extracted from one source file. Its
//! [`Chunk`]s are derived from that text and are replaced wholesale whenever
//! the document is reprocessed.

use serde::{Deserialize, Serialize};

/// A question, optionally scoped to a single document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Query {
    pub question: String,
    /// Target document. When absent (or unknown) the query fans out over
    /// every stored document.
    #[serde(default)]
    pub document_id: Option<String>,
    /// Display title of the targeted document, echoed back in the response.
    #[serde(default)]
    pub document_title: Option<String>,
}

impl Query {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn for_document(question: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            document_id: Some(document_id.into()),
            document_title: None,
        }
    }
}

/// An ingested document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub source_url: Option<String>,
    /// Content type reported by the source (e.g. `application/pdf`).
    pub content_type: String,
    /// Size of the downloaded file in bytes.
    pub file_size: u64,
    /// Extracted plain text. Never mutated; reprocessing stores a new document.
    pub body: String,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub updated_at: i64,
    pub reprocessed: bool,
}

/// One chunk of a document's body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub document_id: String,
    pub chunk_index: i64,
    pub text: String,
}
