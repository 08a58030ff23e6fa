//! TOML configuration.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) yields a working configuration:
//!
//! ```toml
//! [chunking]
//! chunk_size = 1000
//! overlap = 200
//!
//! [retrieval]
//! max_results = 3
//! per_document_results = 2
//! cross_document_limit = 5
//!
//! [answer]
//! locale = "en"        # or "nl"
//!
//! [ingest]
//! timeout_secs = 30
//! max_bytes = 52428800
//!
//! [server]
//! bind = "127.0.0.1:5001"
//!
//! [logging]
//! level = "info"
//! format = "text"      # or "json"
//! ```

use anyhow::{bail, Context, Result};
use docqa_core::chunk::{ChunkConfig, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use docqa_core::compose::Locale;
use docqa_core::query::{
    QueryParams, DEFAULT_CROSS_DOCUMENT_LIMIT, DEFAULT_MAX_RESULTS, DEFAULT_PER_DOCUMENT_RESULTS,
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_overlap() -> usize {
    DEFAULT_OVERLAP
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_per_document_results")]
    pub per_document_results: usize,
    #[serde(default = "default_cross_document_limit")]
    pub cross_document_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            per_document_results: DEFAULT_PER_DOCUMENT_RESULTS,
            cross_document_limit: DEFAULT_CROSS_DOCUMENT_LIMIT,
        }
    }
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}
fn default_per_document_results() -> usize {
    DEFAULT_PER_DOCUMENT_RESULTS
}
fn default_cross_document_limit() -> usize {
    DEFAULT_CROSS_DOCUMENT_LIMIT
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AnswerConfig {
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Downloads larger than this are rejected.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_bytes: default_max_bytes(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_bytes() -> u64 {
    50 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5001".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `docqa=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            chunk_size: self.chunking.chunk_size,
            overlap: self.chunking.overlap,
        }
    }

    pub fn query_params(&self) -> QueryParams {
        QueryParams {
            max_results: self.retrieval.max_results,
            per_document_results: self.retrieval.per_document_results,
            cross_document_limit: self.retrieval.cross_document_limit,
            locale: self.answer.locale,
        }
    }

    pub fn validate(&self) -> Result<()> {
        // Validate chunking
        if self.chunking.chunk_size == 0 {
            bail!("chunking.chunk_size must be > 0");
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            bail!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.overlap,
                self.chunking.chunk_size
            );
        }

        // Validate retrieval
        if self.retrieval.max_results < 1 {
            bail!("retrieval.max_results must be >= 1");
        }
        if self.retrieval.per_document_results < 1 {
            bail!("retrieval.per_document_results must be >= 1");
        }
        if self.retrieval.cross_document_limit < 1 {
            bail!("retrieval.cross_document_limit must be >= 1");
        }

        // Validate ingest
        if self.ingest.timeout_secs == 0 {
            bail!("ingest.timeout_secs must be > 0");
        }
        if self.ingest.max_bytes == 0 {
            bail!("ingest.max_bytes must be > 0");
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Like [`load_config`], but a missing file means all defaults.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.chunk_config(), ChunkConfig::default());
        assert_eq!(config.query_params(), QueryParams::default());
        assert_eq!(config.server.bind, "127.0.0.1:5001");
        assert_eq!(config.ingest.timeout_secs, 30);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn parses_all_sections() {
        let config = parse_config(
            r#"
[chunking]
chunk_size = 500
overlap = 50

[retrieval]
max_results = 4

[answer]
locale = "nl"

[server]
bind = "0.0.0.0:8080"

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.overlap, 50);
        assert_eq!(config.retrieval.max_results, 4);
        assert_eq!(config.retrieval.per_document_results, 2);
        assert_eq!(config.answer.locale, Locale::Nl);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let err = parse_config("[chunking]\nchunk_size = 100\noverlap = 100\n").unwrap_err();
        assert!(err.to_string().contains("chunking.overlap"));
    }

    #[test]
    fn rejects_zero_max_results() {
        assert!(parse_config("[retrieval]\nmax_results = 0\n").is_err());
    }

    #[test]
    fn rejects_unknown_locale() {
        assert!(parse_config("[answer]\nlocale = \"fr\"\n").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = load_config_or_default(Path::new("/nonexistent/docqa.toml")).unwrap();
        assert_eq!(config.chunking.chunk_size, 1000);
    }
}
