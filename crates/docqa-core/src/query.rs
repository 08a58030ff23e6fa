//! Question answering over a [`DocumentStore`].
//!
//! The query pipeline operates entirely through the store trait. A query
//! either targets one document or fans out over all of them:
//!
//! 1. **Targeted** — the document exists: rank its chunks (top
//!    `max_results`) and compose with its title.
//! 2. **Fan-out** — no (known) target: rank each document's chunks (top
//!    `per_document_results`), merge all hits by descending score, keep the
//!    first `cross_document_limit`, and compose over the merged set.
//!    Cross-document hits are merged by score, not concatenated per
//!    document; equal scores keep document id order.
//! 3. **Empty store** — answer with the "no documents" message.

use anyhow::Result;
use serde::Serialize;

use crate::compose::{compose, Locale, Passage};
use crate::models::Query;
use crate::rank::rank_chunks;
use crate::store::DocumentStore;

pub const DEFAULT_MAX_RESULTS: usize = 3;
pub const DEFAULT_PER_DOCUMENT_RESULTS: usize = 2;
pub const DEFAULT_CROSS_DOCUMENT_LIMIT: usize = 5;

/// Retrieval limits and answer language, decoupled from application config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParams {
    /// Chunks kept for a single-document query.
    pub max_results: usize,
    /// Chunks kept per document when fanning out.
    pub per_document_results: usize,
    /// Chunks kept overall when fanning out.
    pub cross_document_limit: usize,
    pub locale: Locale,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            per_document_results: DEFAULT_PER_DOCUMENT_RESULTS,
            cross_document_limit: DEFAULT_CROSS_DOCUMENT_LIMIT,
            locale: Locale::default(),
        }
    }
}

/// What the answer was based on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentContext {
    /// The query's display title, when it targeted a document.
    pub selected_document: Option<String>,
    pub total_documents: usize,
    /// Whether any chunks were actually searched.
    pub search_performed: bool,
}

/// Pipeline output as exposed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    /// Titles of the documents the answer cites, deduplicated.
    pub sources: Vec<String>,
    pub document_context: DocumentContext,
}

/// A ranked hit carried across documents during fan-out.
struct Hit {
    score: usize,
    text: String,
    document_title: String,
}

/// Answer `query` from the documents in `store`.
pub async fn answer_query<S: DocumentStore + ?Sized>(
    store: &S,
    query: &Query,
    params: &QueryParams,
) -> Result<QueryResponse> {
    let question = query.question.trim();
    let documents = store.list_documents().await?;
    let total_documents = documents.len();
    let locale = params.locale;

    let target = match &query.document_id {
        Some(id) => documents.iter().find(|d| &d.id == id),
        None => None,
    };

    let document_context = DocumentContext {
        selected_document: query
            .document_id
            .as_ref()
            .and(query.document_title.clone()),
        total_documents,
        search_performed: match &query.document_id {
            Some(_) => target.is_some(),
            None => total_documents > 0,
        },
    };

    if let Some(doc) = target {
        let chunks = store.document_chunks(&doc.id).await?.unwrap_or_default();
        let ranked = rank_chunks(question, &chunks, params.max_results);
        tracing::debug!(
            document_id = %doc.id,
            chunks = chunks.len(),
            hits = ranked.len(),
            "ranked targeted document"
        );
        let passages: Vec<Passage<'_>> = ranked
            .iter()
            .map(|r| Passage {
                text: r.text,
                document_title: &doc.title,
            })
            .collect();
        let answer = compose(question, &passages, &doc.title, locale);
        return Ok(QueryResponse {
            answer: answer.text,
            sources: answer.citations,
            document_context,
        });
    }

    if documents.is_empty() {
        return Ok(QueryResponse {
            answer: locale.no_documents(question),
            sources: Vec::new(),
            document_context,
        });
    }

    let mut hits: Vec<Hit> = Vec::new();
    for doc in &documents {
        let Some(chunks) = store.document_chunks(&doc.id).await? else {
            continue;
        };
        hits.extend(
            rank_chunks(question, &chunks, params.per_document_results)
                .into_iter()
                .map(|r| Hit {
                    score: r.score,
                    text: r.text.to_string(),
                    document_title: doc.title.clone(),
                }),
        );
    }
    // Stable: equal scores keep document order, then chunk order.
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(params.cross_document_limit);
    tracing::debug!(
        documents = total_documents,
        hits = hits.len(),
        "ranked across documents"
    );

    if hits.is_empty() {
        let titles: Vec<&str> = documents.iter().map(|d| d.title.as_str()).collect();
        return Ok(QueryResponse {
            answer: locale.no_information_in_any(question, &titles),
            sources: Vec::new(),
            document_context,
        });
    }

    let passages: Vec<Passage<'_>> = hits
        .iter()
        .map(|h| Passage {
            text: &h.text,
            document_title: &h.document_title,
        })
        .collect();
    let answer = compose(question, &passages, locale.multiple_documents(), locale);

    Ok(QueryResponse {
        answer: answer.text,
        sources: answer.citations,
        document_context,
    })
}
