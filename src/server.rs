//! Document Q&A HTTP server.
//!
//! Exposes ingestion, question answering and document management as a JSON
//! API. All handlers share one [`DocumentStore`] behind an `Arc`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/health` | Status, version, document count, feature flags |
//! | `POST`   | `/ingest` | Download, extract, chunk and store a document |
//! | `POST`   | `/chat` | Answer a question from one or all documents |
//! | `GET`    | `/documents` | Summaries of all stored documents |
//! | `GET`    | `/documents/{id}/content` | Full extracted text of one document |
//! | `POST`   | `/documents/{id}/reprocess` | Re-download and replace a document |
//! | `DELETE` | `/documents/{id}` | Remove a document |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "question must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `download_failed`
//! (400 for unusable URLs, 502 otherwise), `extraction_failed` (422),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser front-ends can
//! call the API directly.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use docqa_core::models::Query;
use docqa_core::query::{answer_query, QueryResponse};
use docqa_core::store::{DocumentStore, DocumentSummary, InMemoryStore};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::fetch::FetchError;
use crate::ingest::{
    ingest_url, reprocess_url, IngestError, IngestReport, IngestRequest, ReprocessRequest,
};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// State backed by a fresh [`InMemoryStore`].
    pub fn in_memory(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(InMemoryStore::new()),
        }
    }
}

/// Build the application router with CORS applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/ingest", post(handle_ingest))
        .route("/chat", post(handle_chat))
        .route("/documents", get(handle_list_documents))
        .route("/documents/{id}", delete(handle_delete_document))
        .route("/documents/{id}/content", get(handle_document_content))
        .route("/documents/{id}/reprocess", post(handle_reprocess))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server with an empty in-memory store.
///
/// Binds to `bind_override` when given, otherwise to `[server].bind`, and
/// runs until the process is terminated.
pub async fn run_server(config: &Config, bind_override: Option<&str>) -> anyhow::Result<()> {
    let bind_addr = bind_override.unwrap_or(&config.server.bind).to_string();
    let app = router(AppState::in_memory(config.clone()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "server listening");
    println!("docqa server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, message = %self.message, "request failed");
        } else {
            tracing::warn!(code = self.code, message = %self.message, "request rejected");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "not_found", message)
}

fn internal(err: anyhow::Error) -> AppError {
    AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", format!("{:#}", err))
}

/// Missing fields and malformed JSON bodies are client errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        let message = err.to_string();
        match err {
            IngestError::Download(FetchError::InvalidUrl { .. } | FetchError::TooLarge { .. }) => {
                AppError::new(StatusCode::BAD_REQUEST, "download_failed", message)
            }
            IngestError::Download(_) => {
                AppError::new(StatusCode::BAD_GATEWAY, "download_failed", message)
            }
            IngestError::Extract(_) => {
                AppError::new(StatusCode::UNPROCESSABLE_ENTITY, "extraction_failed", message)
            }
            IngestError::Chunk(_) | IngestError::Store(_) => {
                AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
    documents_count: usize,
    features: Features,
}

#[derive(Serialize)]
struct Features {
    pdf_processing: bool,
    docx_processing: bool,
    text_chunking: bool,
    keyword_search: bool,
}

async fn handle_health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let documents_count = state.store.count_documents().await.map_err(internal)?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        documents_count,
        features: Features {
            pdf_processing: true,
            docx_processing: true,
            text_chunking: true,
            keyword_search: true,
        },
    }))
}

// ============ POST /ingest, POST /documents/{id}/reprocess ============

#[derive(Serialize)]
struct IngestResponse {
    success: bool,
    message: String,
    #[serde(flatten)]
    report: IngestReport,
}

impl IngestResponse {
    fn new(report: IngestReport) -> Self {
        let verb = if report.reprocessed { "reprocessed" } else { "processed" };
        Self {
            success: true,
            message: format!("Document '{}' successfully {} and indexed", report.title, verb),
            report,
        }
    }
}

/// Handler for `POST /ingest`.
///
/// Returns `400` when `file_url` or `document_id` is missing or blank.
async fn handle_ingest(
    State(state): State<AppState>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, AppError> {
    let Json(request) = payload?;
    if request.file_url.trim().is_empty() || request.document_id.trim().is_empty() {
        return Err(bad_request("file_url and document_id are required"));
    }
    let report = ingest_url(state.store.as_ref(), &request, &state.config).await?;
    Ok(Json(IngestResponse::new(report)))
}

async fn handle_reprocess(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ReprocessRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, AppError> {
    let Json(request) = payload?;
    if request.file_url.trim().is_empty() {
        return Err(bad_request("file_url is required for reprocessing"));
    }
    let report = reprocess_url(state.store.as_ref(), &id, &request, &state.config).await?;
    Ok(Json(IngestResponse::new(report)))
}

// ============ POST /chat ============

#[derive(Serialize)]
struct ChatResponse {
    #[serde(flatten)]
    response: QueryResponse,
    timestamp: String,
}

/// Handler for `POST /chat`.
///
/// Targets `document_id` when it names a stored document, otherwise
/// searches all documents. Returns `400` for a missing or blank question.
async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<Query>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(query) = payload?;
    if query.question.trim().is_empty() {
        return Err(bad_request("question must not be empty"));
    }
    let response = answer_query(state.store.as_ref(), &query, &state.config.query_params())
        .await
        .map_err(internal)?;
    tracing::info!(
        document_id = query.document_id.as_deref().unwrap_or("*"),
        sources = response.sources.len(),
        "answered question"
    );
    Ok(Json(ChatResponse {
        response,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

// ============ GET /documents ============

#[derive(Serialize)]
struct DocumentListResponse {
    documents: Vec<DocumentSummary>,
    total_count: usize,
}

async fn handle_list_documents(
    State(state): State<AppState>,
) -> Result<Json<DocumentListResponse>, AppError> {
    let documents = state.store.list_documents().await.map_err(internal)?;
    Ok(Json(DocumentListResponse {
        total_count: documents.len(),
        documents,
    }))
}

// ============ GET /documents/{id}/content ============

#[derive(Serialize)]
struct DocumentContentResponse {
    document_id: String,
    title: String,
    content: String,
    chunks_count: usize,
    content_length: usize,
}

async fn handle_document_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentContentResponse>, AppError> {
    let doc = state
        .store
        .get_document(&id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(format!("document not found: {}", id)))?;
    Ok(Json(DocumentContentResponse {
        content_length: doc.body.chars().count(),
        chunks_count: doc.chunks.len(),
        document_id: doc.id,
        title: doc.title,
        content: doc.body,
    }))
}

// ============ DELETE /documents/{id} ============

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    document_id: String,
}

async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    if !state.store.delete_document(&id).await.map_err(internal)? {
        return Err(not_found(format!("document not found: {}", id)));
    }
    tracing::info!(document_id = %id, "document deleted");
    Ok(Json(DeleteResponse {
        success: true,
        document_id: id,
    }))
}
