// ⚠️ Errors - Taxonomy for one pipeline run
// Fetch and enrichment errors are recovered inside the pipeline; dataset errors abort it

use std::path::PathBuf;
use thiserror::Error;

/// A source could not be fetched or parsed. The source contributes nothing.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Poster lookup failed. The record keeps going without a poster.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Unauthorized - check the TMDb API key (v3 auth)")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Output could not be written. Fatal.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}
