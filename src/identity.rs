// 🔑 Identity Resolver - Cross-source matching key
// Two records with the same (normalized title, year) describe the same film

use crate::record::FilmRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Key used to detect that differently-sourced records are one film.
///
/// A missing year is its own bucket: "Heat" with no year never collides
/// with "Heat" (1995).
///
/// Known limitation: two distinct films sharing an exact title and year
/// collapse into one record. Downstream consumers rely on that behavior.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    pub title: String,
    pub year: Option<i32>,
}

impl MatchKey {
    pub fn new(title: &str, year: Option<i32>) -> Self {
        MatchKey {
            title: normalize_title(title),
            year,
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{} (n/a)", self.title),
        }
    }
}

/// Case-folded, trimmed title
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Matching key for a record
pub fn match_key(record: &FilmRecord) -> MatchKey {
    MatchKey::new(&record.title, record.year)
}

/// Deterministic identity for records without an external id.
///
/// Hash of the normalized title and year, prefixed with the source family so
/// fallback identities from different sources never clash.
pub fn fallback_identity(family: &str, title: &str, year: Option<i32>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_title(title).as_bytes());
    hasher.update(b"|");
    if let Some(year) = year {
        hasher.update(year.to_string().as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    format!("{}-{}", family, &digest[..16])
}

// ============================================================================
// TESTS
// ============================================================================
