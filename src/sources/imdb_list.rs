// IMDb list export (CSV) - Manual import
// Columns typically: Const, Your Rating, Date Rated, Title, URL, Title Type,
// IMDb Rating, Runtime (mins), Year, Genres, Num Votes, Release Date, Directors

use super::{RawItem, SourceFetcher, SourceKind};
use crate::error::FetchError;
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

pub struct ImdbListSource {
    path: PathBuf,
}

impl ImdbListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ImdbListSource { path: path.into() }
    }
}

impl SourceFetcher for ImdbListSource {
    fn kind(&self) -> SourceKind {
        SourceKind::ImdbList
    }

    fn fetch(&self) -> Result<Vec<RawItem>, FetchError> {
        let file = File::open(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_export(file)
    }
}

/// Each CSV row becomes a JSON object keyed by header.
///
/// An unreadable header is fatal; an unreadable row is skipped.
pub fn parse_export<R: Read>(reader: R) -> Result<Vec<RawItem>, FetchError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut items = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                tracing::warn!(row = idx + 1, error = %e, "Skipping unreadable IMDb export row");
                continue;
            }
        };

        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.trim().to_string(), Value::String(value.to_string())))
            .collect();

        items.push(RawItem::new(SourceKind::ImdbList, Value::Object(row), idx));
    }

    Ok(items)
}

// ============================================================================
// TESTS
// ============================================================================
