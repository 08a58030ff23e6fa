//! `docqa ask`: answer a question from local files without a server.
//!
//! Every `--file` is ingested into a fresh in-memory store, then the query
//! pipeline runs exactly as it does behind `POST /chat`.

use anyhow::{bail, Result};
use docqa_core::models::Query;
use docqa_core::query::{answer_query, QueryResponse};
use docqa_core::store::{DocumentStore, InMemoryStore};
use std::path::PathBuf;

use crate::config::Config;
use crate::ingest::{ingest_file, source_from_path};

/// Ingest `files` and answer `question`, optionally scoped to the document
/// whose id (file name) is `document`.
pub async fn ask_files(
    config: &Config,
    question: &str,
    files: &[PathBuf],
    document: Option<&str>,
) -> Result<QueryResponse> {
    if question.trim().is_empty() {
        bail!("question must not be empty");
    }

    let store = InMemoryStore::new();
    for path in files {
        ingest_file(&store, source_from_path(path)?, config, false).await?;
    }

    let mut query = Query::new(question);
    if let Some(id) = document {
        query.document_title = store.get_document_metadata(id).await?.map(|m| m.title);
        query.document_id = Some(id.to_string());
    }

    answer_query(&store, &query, &config.query_params()).await
}

pub async fn run_ask(
    config: &Config,
    question: &str,
    files: &[PathBuf],
    document: Option<&str>,
) -> Result<()> {
    let response = ask_files(config, question, files, document).await?;

    println!("{}", response.answer);
    println!();
    if response.sources.is_empty() {
        println!("Sources: (none)");
    } else {
        println!("Sources:");
        for source in &response.sources {
            println!("  - {}", source);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn answers_from_targeted_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write(&dir, "install.txt", "The installation procedure takes ten minutes."),
            write(&dir, "billing.txt", "Invoices are sent monthly."),
        ];

        let response = ask_files(
            &Config::default(),
            "How long does the installation procedure take?",
            &files,
            Some("install.txt"),
        )
        .await
        .unwrap();

        assert_eq!(response.sources, vec!["install.txt".to_string()]);
        assert_eq!(
            response.document_context.selected_document.as_deref(),
            Some("install.txt")
        );
        assert!(response.document_context.search_performed);
        assert_eq!(response.document_context.total_documents, 2);
    }

    #[tokio::test]
    async fn fans_out_without_target() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write(&dir, "a.txt", "Invoices are sent monthly."),
            write(&dir, "b.txt", "Refunds take five days."),
        ];

        let response = ask_files(&Config::default(), "when are invoices sent", &files, None)
            .await
            .unwrap();
        assert_eq!(response.sources, vec!["a.txt".to_string()]);
        assert!(response.document_context.selected_document.is_none());
    }

    #[tokio::test]
    async fn rejects_blank_question() {
        let err = ask_files(&Config::default(), "  ", &[], None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }
}
