// 🎬 Film Record - Canonical shape shared by every source
// Wire names follow the dataset files the recommendation app reads

use crate::source_tag::SourceTag;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// FilmRecord with opaque per-source extras.
///
/// Core fields are typed; anything a source adds beyond them (description,
/// bechdel_rating, curated QID lists, ...) lives in `extra` and is written
/// back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmRecord {
    // ========================================================================
    // IDENTITY
    // ========================================================================
    /// Stable identity, e.g. "bechdel-tt0111161"
    #[serde(rename = "qid")]
    pub identity: String,

    // ========================================================================
    // CORE FIELDS
    // ========================================================================
    pub title: String,

    #[serde(default)]
    pub year: Option<i32>,

    /// IMDb id, always "tt"-prefixed
    #[serde(rename = "imdbId", default)]
    pub external_id: Option<String>,

    #[serde(default)]
    pub genres: Vec<String>,

    #[serde(default)]
    pub directors: Vec<String>,

    #[serde(default)]
    pub cast: Vec<String>,

    #[serde(default)]
    pub runtime: Option<u32>,

    pub source: SourceTag,

    #[serde(rename = "poster_url", default)]
    pub poster_url: Option<String>,

    // ========================================================================
    // EXTENSIBLE METADATA
    // ========================================================================
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FilmRecord {
    /// Create a record with required fields, everything else empty
    pub fn new(identity: String, title: String, source: SourceTag) -> Self {
        FilmRecord {
            identity,
            title,
            year: None,
            external_id: None,
            genres: Vec::new(),
            directors: Vec::new(),
            cast: Vec::new(),
            runtime: None,
            source,
            poster_url: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_external_id(mut self, external_id: Option<String>) -> Self {
        self.external_id = external_id;
        self
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.extra.get("description").and_then(|v| v.as_str())
    }
}

pub fn imdb_title_url(imdb_id: &str) -> String {
    format!("https://www.imdb.com/title/{}/", imdb_id)
}

// ============================================================================
// TESTS
// ============================================================================
