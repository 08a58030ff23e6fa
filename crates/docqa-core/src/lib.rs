//! # docqa Core
//!
//! Runtime-free logic for docqa: data models, the overlapping text chunker,
//! the keyword-overlap relevance ranker, the templated answer composer, the
//! document store abstraction, and the query pipeline that ties them together.
//!
//! This crate contains no tokio, HTTP, filesystem, or document-format
//! dependencies. Callers hand it plain text and get ranked chunks and
//! composed answers back.
//!
//! ```text
//! text ──▶ chunk ──▶ Store ──▶ rank(query) ──▶ compose ──▶ answer + sources
//! ```

pub mod chunk;
pub mod compose;
pub mod models;
pub mod query;
pub mod rank;
pub mod store;

pub use chunk::{chunk_document, chunk_text, ChunkConfig, ChunkError};
pub use compose::{compose, Answer, Locale, Passage, QuestionKind};
pub use query::{answer_query, DocumentContext, QueryParams, QueryResponse};
pub use rank::{rank_chunks, RankedChunk};
