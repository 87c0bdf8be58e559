// 🏗️ Source Fetchers - One producer of raw items per upstream
// Fetchers only produce JSON-shaped items; the normalizer decides what they mean

pub mod bechdel;
pub mod feed;
pub mod imdb_list;
pub mod seed;

pub use bechdel::BechdelApiSource;
pub use feed::BechdelFeedSource;
pub use imdb_list::ImdbListSource;
pub use seed::SeedFileSource;

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("film-corpus/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// CORE TYPES
// ============================================================================

/// SourceKind - Which upstream an item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    SeedFile,
    BechdelApi,
    BechdelFeed,
    ImdbList,
}

impl SourceKind {
    /// Human-readable name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::SeedFile => "Seed file",
            SourceKind::BechdelApi => "Bechdel Test API",
            SourceKind::BechdelFeed => "Bechdel Test RSS",
            SourceKind::ImdbList => "IMDb list export",
        }
    }

    /// Identity prefix for records built from this source
    pub fn family(&self) -> &'static str {
        match self {
            SourceKind::SeedFile => "seed",
            SourceKind::BechdelApi => "bechdel",
            SourceKind::BechdelFeed => "bechdel-rss",
            SourceKind::ImdbList => "imdb",
        }
    }

    /// Whether fetching this source touches the network
    pub fn is_remote(&self) -> bool {
        matches!(self, SourceKind::BechdelApi | SourceKind::BechdelFeed)
    }
}

/// RawItem - Output of fetcher.fetch(), before normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    pub kind: SourceKind,

    /// JSON object as delivered (or as rebuilt from CSV/RSS)
    pub payload: Value,

    /// Position in the fetched batch
    pub position: usize,
}

impl RawItem {
    pub fn new(kind: SourceKind, payload: Value, position: usize) -> Self {
        RawItem {
            kind,
            payload,
            position,
        }
    }

    /// String field, trimmed, empty treated as absent
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// First present string field among aliases
    pub fn str_field_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.str_field(key))
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key).filter(|v| !v.is_null())
    }
}

// ============================================================================
// FETCHER TRAIT
// ============================================================================

/// SourceFetcher - Core trait for every upstream
///
/// A failure is returned, never panicked; the pipeline logs it and moves on
/// with the next source.
pub trait SourceFetcher {
    fn kind(&self) -> SourceKind;

    fn fetch(&self) -> Result<Vec<RawItem>, FetchError>;
}

/// Blocking HTTP client shared by the remote fetchers
pub fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// GET a URL, turning non-2xx statuses into errors
fn get_checked(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<reqwest::blocking::Response, FetchError> {
    tracing::debug!(url = %url, "GET");
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

// ============================================================================
// TESTS
// ============================================================================
