//! `docqa chunk <file>`: print the chunk set of a local file.

use anyhow::Result;
use docqa_core::chunk::chunk_text;
use std::path::Path;

use crate::config::Config;
use crate::extract::extract_text;
use crate::ingest::source_from_path;

/// Extract and chunk `path` with the configured chunk size and overlap.
pub fn chunk_file(config: &Config, path: &Path) -> Result<Vec<String>> {
    let source = source_from_path(path)?;
    let text = extract_text(&source.bytes, &source.title, &source.content_type)?;
    Ok(chunk_text(&text, &config.chunk_config())?)
}

pub fn run_chunk(config: &Config, path: &Path) -> Result<()> {
    let chunks = chunk_file(config, path)?;

    println!(
        "--- {} ({} chunks, size {}, overlap {}) ---",
        path.display(),
        chunks.len(),
        config.chunking.chunk_size,
        config.chunking.overlap
    );
    for (i, chunk) in chunks.iter().enumerate() {
        println!("[chunk {}] {} chars", i, chunk.chars().count());
        println!("{}", chunk);
        println!();
    }

    Ok(())
}
