//! Document download over HTTP(S).

use std::time::Duration;

use crate::config::IngestConfig;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid download URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url} is larger than the {limit} byte limit")]
    TooLarge { url: String, limit: u64 },
}

/// A downloaded file.
#[derive(Debug, Clone)]
pub struct Downloaded {
    pub bytes: Vec<u8>,
    /// `Content-Type` header, or `"unknown"` when absent.
    pub content_type: String,
}

/// Download `url`, failing on non-2xx responses and bodies over
/// `config.max_bytes`.
pub async fn download(url: &str, config: &IngestConfig) -> Result<Downloaded, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    let request_err = |source: reqwest::Error| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(request_err)?;

    let mut response = client.get(parsed).send().await.map_err(request_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let too_large = || FetchError::TooLarge {
        url: url.to_string(),
        limit: config.max_bytes,
    };
    if response.content_length().is_some_and(|len| len > config.max_bytes) {
        return Err(too_large());
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let mut bytes = Vec::new();
    while let Some(piece) = response.chunk().await.map_err(request_err)? {
        if bytes.len() as u64 + piece.len() as u64 > config.max_bytes {
            return Err(too_large());
        }
        bytes.extend_from_slice(&piece);
    }

    tracing::debug!(url, bytes = bytes.len(), %content_type, "downloaded document");
    Ok(Downloaded {
        bytes,
        content_type,
    })
}
