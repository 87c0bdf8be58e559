// 🌱 Seed file - Prior corpus in dataset shape
// A missing file is an empty corpus, not an error

use super::{RawItem, SourceFetcher, SourceKind};
use crate::error::FetchError;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct SeedFileSource {
    path: PathBuf,
}

impl SeedFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SeedFileSource { path: path.into() }
    }
}

impl SourceFetcher for SeedFileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SeedFile
    }

    fn fetch(&self) -> Result<Vec<RawItem>, FetchError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Seed file not found, starting fresh");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(FetchError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let document: Value = serde_json::from_str(&content)
            .map_err(|e| FetchError::Parse(format!("{}: {}", self.path.display(), e)))?;

        // Dataset-shaped document, or a bare array of films
        let films = match document {
            Value::Array(films) => films,
            Value::Object(mut map) => match map.remove("films") {
                Some(Value::Array(films)) => films,
                Some(_) => {
                    return Err(FetchError::Parse(format!(
                        "{}: 'films' is not an array",
                        self.path.display()
                    )))
                }
                None => Vec::new(),
            },
            _ => {
                return Err(FetchError::Parse(format!(
                    "{}: expected a dataset object",
                    self.path.display()
                )))
            }
        };

        Ok(films
            .into_iter()
            .enumerate()
            .map(|(idx, film)| RawItem::new(SourceKind::SeedFile, film, idx))
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_seed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = SeedFileSource::new(dir.path().join("seed-films.json"));

        assert!(source.fetch().unwrap().is_empty());
    }

    #[test]
    fn test_reads_films_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"version": "2.0", "films": [{{"qid": "Q1", "title": "Up"}}, {{"qid": "Q2", "title": "Coco"}}]}}"#
        )
        .unwrap();

        let items = SeedFileSource::new(file.path()).fetch().unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].position, 1);
        assert_eq!(items[1].str_field("title"), Some("Coco"));
        assert_eq!(items[0].kind, SourceKind::SeedFile);
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let result = SeedFileSource::new(file.path()).fetch();
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }
}
