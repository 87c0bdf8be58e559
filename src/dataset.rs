// 💾 Dataset Writer - Core and extended outputs
// Both files go to temp files first and are swapped in together

use crate::error::DatasetError;
use crate::record::FilmRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Versioned collection of films, as read by the recommendation app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub version: String,

    /// Written as RFC 3339; older files without an offset are read as UTC
    #[serde(deserialize_with = "lenient_timestamp")]
    pub generated: DateTime<Utc>,

    /// Free-text label
    pub source: String,

    #[serde(default)]
    pub description: String,

    /// Source tag → film count
    pub sources_included: BTreeMap<String, usize>,

    pub total_films: usize,

    pub films: Vec<FilmRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    /// Curated, size-bounded default corpus
    Core,

    /// Everything merged
    Extended,
}

impl DatasetKind {
    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Core => "Core recognizable films",
            DatasetKind::Extended => "Extended multi-source dataset",
        }
    }

    pub fn description(&self, core_min_year: i32) -> String {
        match self {
            DatasetKind::Core => format!(
                "Recent films ({}+) and major classics - default dataset",
                core_min_year
            ),
            DatasetKind::Extended => {
                "All films from Bechdel Test, IMDB lists, RSS, and curated sources".to_string()
            }
        }
    }
}

pub struct DatasetWriter {
    version: String,
    generated: DateTime<Utc>,
}

impl DatasetWriter {
    pub fn new(version: impl Into<String>) -> Self {
        Self::at(version, Utc::now())
    }

    /// Writer with a fixed timestamp
    pub fn at(version: impl Into<String>, generated: DateTime<Utc>) -> Self {
        DatasetWriter {
            version: version.into(),
            generated,
        }
    }

    /// Build a dataset from records, sorted by (source, title)
    pub fn build(&self, records: &[FilmRecord], kind: DatasetKind, description: &str) -> Dataset {
        let mut films = records.to_vec();
        films.sort_by(|a, b| {
            a.source
                .as_str()
                .cmp(b.source.as_str())
                .then_with(|| a.title.cmp(&b.title))
        });

        Dataset {
            version: self.version.clone(),
            generated: self.generated,
            source: kind.label().to_string(),
            description: description.to_string(),
            sources_included: source_counts(&films),
            total_films: films.len(),
            films,
        }
    }

    /// Write both datasets or neither.
    ///
    /// Both are serialized to temp files beside their targets before either
    /// target is touched.
    pub fn write_pair(
        &self,
        core: (&Dataset, &Path),
        extended: (&Dataset, &Path),
    ) -> Result<(), DatasetError> {
        let core_tmp = stage(core.0, core.1)?;
        let extended_tmp = stage(extended.0, extended.1)?;

        persist(extended_tmp, extended.1)?;
        persist(core_tmp, core.1)?;

        tracing::info!(
            core = %core.1.display(),
            extended = %extended.1.display(),
            "Saved datasets"
        );
        Ok(())
    }
}

/// Count films per source tag
pub fn source_counts(films: &[FilmRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for film in films {
        *counts.entry(film.source.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DatasetError + '_ {
    move |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn stage(dataset: &Dataset, target: &Path) -> Result<NamedTempFile, DatasetError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = NamedTempFile::new_in(&dir).map_err(io_error(target))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, dataset)?;
        writer.write_all(b"\n").map_err(io_error(target))?;
        writer.flush().map_err(io_error(target))?;
    }
    Ok(tmp)
}

fn persist(tmp: NamedTempFile, target: &Path) -> Result<(), DatasetError> {
    tmp.persist(target).map_err(|source| DatasetError::Persist {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// RFC 3339, naive ISO 8601 ("2024-05-01T12:00:00.123456") or a bare date
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(raw.trim())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = text.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Read a dataset file back
pub fn read_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let file = File::open(path).map_err(io_error(path))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

// ============================================================================
// TESTS
// ============================================================================
