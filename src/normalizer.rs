// 🧹 Record Normalizer - Raw per-source item → FilmRecord
// Never raises: an unusable item comes back as a Skip reason

use crate::config::NormalizeConfig;
use crate::enrichment::PosterLookup;
use crate::identity::fallback_identity;
use crate::record::FilmRecord;
use crate::source_tag::{KnownSource, SourceTag};
use crate::sources::{RawItem, SourceKind};
use regex_lite::Regex;
use serde_json::{json, Value};
use std::fmt;
use std::sync::OnceLock;

// ============================================================================
// SKIP REASON
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Skip {
    /// Item is not a JSON object
    NotAnObject,

    MissingTitle,

    /// Source requires an IMDb id and none was found
    MissingExternalId,

    /// Bechdel rating below the configured minimum
    BelowMinRating(i64),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::NotAnObject => write!(f, "not an object"),
            Skip::MissingTitle => write!(f, "missing title"),
            Skip::MissingExternalId => write!(f, "missing IMDb id"),
            Skip::BelowMinRating(rating) => write!(f, "bechdel rating {} below minimum", rating),
        }
    }
}

// ============================================================================
// NORMALIZER
// ============================================================================

pub struct Normalizer {
    min_rating: i64,
    description_max_chars: usize,
}

impl Normalizer {
    pub fn new(config: &NormalizeConfig) -> Self {
        Normalizer {
            min_rating: config.bechdel_min_rating,
            description_max_chars: config.description_max_chars,
        }
    }

    /// Build the canonical record for one raw item.
    ///
    /// The poster lookup is consulted at most once, and only for items that
    /// arrive without a poster from a source other than the seed file.
    pub fn normalize(&self, item: &RawItem, posters: &dyn PosterLookup) -> Result<FilmRecord, Skip> {
        if !item.payload.is_object() {
            return Err(Skip::NotAnObject);
        }

        let mut record = match item.kind {
            SourceKind::SeedFile => self.from_seed(item)?,
            SourceKind::BechdelApi => self.from_bechdel(item)?,
            SourceKind::BechdelFeed => self.from_feed(item)?,
            SourceKind::ImdbList => self.from_imdb_list(item)?,
        };

        if item.kind != SourceKind::SeedFile {
            if let Some(description) = record.description() {
                let cut = truncate_chars(description, self.description_max_chars);
                record.extra.insert("description".to_string(), json!(cut));
            }

            if record.poster_url.is_none() {
                record.poster_url =
                    posters.poster_url(&record.title, record.year, record.external_id.as_deref());
            }
        }

        Ok(record)
    }

    /// Seed items are already in dataset shape; keep everything, coerce types
    fn from_seed(&self, item: &RawItem) -> Result<FilmRecord, Skip> {
        let title = item.str_field("title").ok_or(Skip::MissingTitle)?.to_string();
        let year = item.field("year").and_then(coerce_year);
        let external_id = item.str_field("imdbId").map(normalize_imdb_id);

        let identity = item
            .str_field("qid")
            .map(str::to_string)
            .unwrap_or_else(|| fallback_identity(SourceKind::SeedFile.family(), &title, year));

        let source = item
            .str_field("source")
            .map(SourceTag::parse)
            .unwrap_or(SourceTag::Known(KnownSource::Seed));

        let mut record = FilmRecord::new(identity, title, source)
            .with_year(year)
            .with_external_id(external_id);
        record.genres = string_list(item.field("genres"));
        record.directors = string_list(item.field("directors"));
        record.cast = string_list(item.field("cast"));
        record.runtime = item.field("runtime").and_then(coerce_runtime);
        record.poster_url = item.str_field("poster_url").map(str::to_string);

        if let Some(map) = item.payload.as_object() {
            for (key, value) in map {
                if !CORE_KEYS.contains(&key.as_str()) {
                    record.extra.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(record)
    }

    fn from_bechdel(&self, item: &RawItem) -> Result<FilmRecord, Skip> {
        let rating = item.field("rating").and_then(coerce_int).unwrap_or(0);
        if rating < self.min_rating {
            return Err(Skip::BelowMinRating(rating));
        }

        let title = item.str_field("title").ok_or(Skip::MissingTitle)?.to_string();
        let imdb_id = item
            .field("imdbid")
            .and_then(value_as_text)
            .map(|id| normalize_imdb_id(&id))
            .ok_or(Skip::MissingExternalId)?;
        let year = item.field("year").and_then(coerce_year);

        Ok(
            FilmRecord::new(external_identity(item.kind, &imdb_id), title, KnownSource::Bechdel.into())
                .with_year(year)
                .with_external_id(Some(imdb_id))
                .with_extra("bechdel_rating", json!(rating)),
        )
    }

    fn from_feed(&self, item: &RawItem) -> Result<FilmRecord, Skip> {
        let raw_title = item.str_field("title").ok_or(Skip::MissingTitle)?;
        let (title, year) = split_feed_title(raw_title);
        if title.is_empty() {
            return Err(Skip::MissingTitle);
        }

        let imdb_id = item
            .str_field("link")
            .and_then(imdb_id_from_link)
            .or_else(|| item.str_field("summary").and_then(find_imdb_id))
            .ok_or(Skip::MissingExternalId)?;

        let mut record = FilmRecord::new(
            external_identity(item.kind, &imdb_id),
            title.to_string(),
            KnownSource::BechdelRss.into(),
        )
        .with_year(year)
        .with_external_id(Some(imdb_id));

        if let Some(summary) = item.str_field("summary") {
            record = record.with_extra("description", json!(summary));
        }

        Ok(record)
    }

    fn from_imdb_list(&self, item: &RawItem) -> Result<FilmRecord, Skip> {
        let title = item
            .str_field_any(&["Title", "title"])
            .ok_or(Skip::MissingTitle)?
            .to_string();
        let imdb_id = item
            .str_field_any(&["Const", "imdb_id"])
            .map(normalize_imdb_id)
            .ok_or(Skip::MissingExternalId)?;
        let year = item
            .str_field_any(&["Release Date", "Year", "year"])
            .and_then(parse_year);

        let mut record = FilmRecord::new(
            external_identity(item.kind, &imdb_id),
            title,
            KnownSource::ImdbList.into(),
        )
        .with_year(year)
        .with_external_id(Some(imdb_id));
        record.genres = split_list(item.str_field("Genres"));
        record.directors = split_list(item.str_field("Directors"));
        record.runtime = item
            .str_field("Runtime (mins)")
            .and_then(|s| s.parse::<u32>().ok());

        Ok(record)
    }
}

/// Fields that map onto typed FilmRecord fields
const CORE_KEYS: &[&str] = &[
    "qid",
    "title",
    "year",
    "imdbId",
    "genres",
    "directors",
    "cast",
    "runtime",
    "source",
    "poster_url",
];

fn external_identity(kind: SourceKind, imdb_id: &str) -> String {
    format!("{}-{}", kind.family(), imdb_id)
}

// ============================================================================
// COERCION HELPERS
// ============================================================================

/// Year from an int or a string like "2001" / "2001-05-12"; anything else is None
pub fn coerce_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(valid_year),
        Value::String(s) => parse_year(s),
        _ => None,
    }
}

/// Year from the leading part of a date-ish string
pub fn parse_year(text: &str) -> Option<i32> {
    let head = text.trim().split('-').next()?;
    head.trim().parse::<i64>().ok().and_then(valid_year)
}

fn valid_year(year: i64) -> Option<i32> {
    if (1000..=9999).contains(&year) {
        Some(year as i32)
    } else {
        None
    }
}

fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_runtime(value: &Value) -> Option<u32> {
    coerce_int(value).and_then(|minutes| u32::try_from(minutes).ok())
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => split_list(Some(s)),
        _ => Vec::new(),
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// "0111161" → "tt0111161"; already-prefixed ids pass through
pub fn normalize_imdb_id(id: &str) -> String {
    let id = id.trim();
    if id.starts_with("tt") {
        id.to_string()
    } else {
        format!("tt{}", id)
    }
}

/// Cut to at most `max` characters on a char boundary
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

// ============================================================================
// TEXT EXTRACTION
// ============================================================================

fn imdb_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"tt\d+").unwrap())
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d{4})\)").unwrap())
}

/// "https://www.imdb.com/title/tt123/" → "tt123"
fn imdb_id_from_link(link: &str) -> Option<String> {
    if !link.contains("imdb.com") {
        return None;
    }
    let (_, rest) = link.split_once("/title/")?;
    let id = rest.split('/').next()?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn find_imdb_id(text: &str) -> Option<String> {
    imdb_id_re().find(text).map(|m| m.as_str().to_string())
}

/// "(500) Days of Summer (2009)" → ("(500) Days of Summer", Some(2009))
///
/// The title ends at the last "(YYYY)"; without one, at the first "(" unless
/// that leaves nothing.
fn split_feed_title(text: &str) -> (&str, Option<i32>) {
    if let Some(caps) = year_re().captures_iter(text).last() {
        let start = caps.get(0).map_or(text.len(), |m| m.start());
        let year = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .and_then(valid_year);
        return (text[..start].trim(), year);
    }

    match text.split('(').next().map(str::trim) {
        Some(head) if !head.is_empty() => (head, None),
        _ => (text.trim(), None),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{ImdbTitleLink, NoPosters};
    use std::cell::Cell;

    fn normalizer() -> Normalizer {
        Normalizer::new(&NormalizeConfig::default())
    }

    fn item(kind: SourceKind, payload: Value) -> RawItem {
        RawItem::new(kind, payload, 0)
    }

    /// Counts calls and answers with a fixed URL
    struct CountingLookup {
        calls: Cell<usize>,
    }

    impl PosterLookup for CountingLookup {
        fn poster_url(&self, _: &str, _: Option<i32>, _: Option<&str>) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            Some("https://img.example/p.jpg".to_string())
        }
    }

    #[test]
    fn test_bechdel_passing_film() {
        let raw = item(
            SourceKind::BechdelApi,
            json!({"title": "Alien", "year": "1979", "imdbid": "0078748", "rating": "3", "id": 12}),
        );

        let record = normalizer().normalize(&raw, &ImdbTitleLink).unwrap();

        assert_eq!(record.identity, "bechdel-tt0078748");
        assert_eq!(record.external_id.as_deref(), Some("tt0078748"));
        assert_eq!(record.year, Some(1979));
        assert_eq!(record.source.as_str(), "bechdel");
        assert_eq!(record.extra["bechdel_rating"], json!(3));
        assert_eq!(
            record.poster_url.as_deref(),
            Some("https://www.imdb.com/title/tt0078748/")
        );
        assert!(record.genres.is_empty());
        assert!(record.cast.is_empty());
    }

    #[test]
    fn test_bechdel_below_rating_is_skipped() {
        let raw = item(
            SourceKind::BechdelApi,
            json!({"title": "Heat", "year": 1995, "imdbid": "0113277", "rating": 1}),
        );

        assert_eq!(
            normalizer().normalize(&raw, &NoPosters),
            Err(Skip::BelowMinRating(1))
        );
    }

    #[test]
    fn test_bechdel_without_imdb_id_is_skipped() {
        let raw = item(SourceKind::BechdelApi, json!({"title": "Nameless", "rating": 3}));
        assert_eq!(
            normalizer().normalize(&raw, &NoPosters),
            Err(Skip::MissingExternalId)
        );
    }

    #[test]
    fn test_malformed_year_becomes_null() {
        for year in [json!("19x9"), json!(0), json!(12345), json!(null), json!([1999])] {
            let raw = item(
                SourceKind::BechdelApi,
                json!({"title": "Odd", "year": year, "imdbid": "1", "rating": 3}),
            );
            assert_eq!(normalizer().normalize(&raw, &NoPosters).unwrap().year, None);
        }
    }

    #[test]
    fn test_feed_entry() {
        let raw = item(
            SourceKind::BechdelFeed,
            json!({
                "title": "Past Lives (2023)",
                "link": "https://bechdeltest.com/view/11234/",
                "summary": "See https://www.imdb.com/title/tt13238346/ for details"
            }),
        );

        let record = normalizer().normalize(&raw, &NoPosters).unwrap();

        assert_eq!(record.title, "Past Lives");
        assert_eq!(record.year, Some(2023));
        assert_eq!(record.identity, "bechdel-rss-tt13238346");
        assert_eq!(record.source.as_str(), "bechdel-rss");
    }

    #[test]
    fn test_feed_title_with_leading_parenthesis() {
        let raw = item(
            SourceKind::BechdelFeed,
            json!({"title": "(500) Days of Summer (2009)", "link": "https://www.imdb.com/title/tt1022603/"}),
        );

        let record = normalizer().normalize(&raw, &NoPosters).unwrap();

        assert_eq!(record.title, "(500) Days of Summer");
        assert_eq!(record.year, Some(2009));
    }

    #[test]
    fn test_feed_year_must_have_four_real_digits() {
        assert_eq!(split_feed_title("X (0999)"), ("X", None));
        assert_eq!(split_feed_title("Nope (Director's Cut)"), ("Nope", None));
        assert_eq!(split_feed_title("Heat"), ("Heat", None));
    }

    #[test]
    fn test_feed_prefers_imdb_link() {
        let raw = item(
            SourceKind::BechdelFeed,
            json!({"title": "Barbie (2023)", "link": "https://www.imdb.com/title/tt1517268/", "summary": "tt0000001"}),
        );

        let record = normalizer().normalize(&raw, &NoPosters).unwrap();
        assert_eq!(record.external_id.as_deref(), Some("tt1517268"));
    }

    #[test]
    fn test_feed_without_id_is_skipped() {
        let raw = item(
            SourceKind::BechdelFeed,
            json!({"title": "Mystery (2020)", "link": "https://bechdeltest.com/view/1/", "summary": ""}),
        );
        assert_eq!(
            normalizer().normalize(&raw, &NoPosters),
            Err(Skip::MissingExternalId)
        );
    }

    #[test]
    fn test_description_is_truncated() {
        let long = format!("tt1234567 {}", "é".repeat(500));
        let raw = item(
            SourceKind::BechdelFeed,
            json!({"title": "Long (2001)", "link": "", "summary": long}),
        );

        let record = normalizer().normalize(&raw, &NoPosters).unwrap();

        assert_eq!(record.description().unwrap().chars().count(), 200);
    }

    #[test]
    fn test_imdb_list_row() {
        let raw = item(
            SourceKind::ImdbList,
            json!({
                "Const": "0068646",
                "Title": "The Godfather",
                "Release Date": "1972-03-24",
                "Genres": "Crime, Drama",
                "Directors": "Francis Ford Coppola",
                "Runtime (mins)": "175"
            }),
        );

        let record = normalizer().normalize(&raw, &ImdbTitleLink).unwrap();

        assert_eq!(record.identity, "imdb-tt0068646");
        assert_eq!(record.year, Some(1972));
        assert_eq!(record.genres, vec!["Crime", "Drama"]);
        assert_eq!(record.directors, vec!["Francis Ford Coppola"]);
        assert_eq!(record.runtime, Some(175));
        assert_eq!(record.source.as_str(), "imdb-list");
    }

    #[test]
    fn test_imdb_list_requires_title_and_id() {
        let no_title = item(SourceKind::ImdbList, json!({"Const": "tt1"}));
        let no_id = item(SourceKind::ImdbList, json!({"Title": "Up"}));

        assert_eq!(normalizer().normalize(&no_title, &NoPosters), Err(Skip::MissingTitle));
        assert_eq!(normalizer().normalize(&no_id, &NoPosters), Err(Skip::MissingExternalId));
    }

    #[test]
    fn test_seed_record_is_preserved() {
        let raw = item(
            SourceKind::SeedFile,
            json!({
                "qid": "Q172241",
                "title": "Parasite",
                "year": 2019,
                "imdbId": "tt6751668",
                "genres": ["thriller", "drama"],
                "directors": ["Bong Joon-ho"],
                "runtime": 132,
                "source": "international",
                "directorQIDs": ["Q495980"],
                "description": "x".repeat(300)
            }),
        );

        let lookup = CountingLookup { calls: Cell::new(0) };
        let record = normalizer().normalize(&raw, &lookup).unwrap();

        assert_eq!(record.identity, "Q172241");
        assert_eq!(record.source.as_str(), "international");
        assert_eq!(record.genres.len(), 2);
        assert_eq!(record.runtime, Some(132));
        assert_eq!(record.extra["directorQIDs"], json!(["Q495980"]));
        assert_eq!(record.description().unwrap().len(), 300);
        assert_eq!(record.poster_url, None);
        assert_eq!(lookup.calls.get(), 0);
    }

    #[test]
    fn test_seed_without_qid_gets_fallback_identity() {
        let a = item(SourceKind::SeedFile, json!({"title": "Up ", "year": 2009}));
        let b = item(SourceKind::SeedFile, json!({"title": "up", "year": "2009"}));

        let ra = normalizer().normalize(&a, &NoPosters).unwrap();
        let rb = normalizer().normalize(&b, &NoPosters).unwrap();

        assert_eq!(ra.identity, rb.identity);
        assert!(ra.identity.starts_with("seed-"));
        assert_eq!(ra.source.as_str(), "seed");
    }

    #[test]
    fn test_seed_without_title_is_skipped() {
        let raw = item(SourceKind::SeedFile, json!({"qid": "Q1", "title": "   "}));
        assert_eq!(normalizer().normalize(&raw, &NoPosters), Err(Skip::MissingTitle));
    }

    #[test]
    fn test_lookup_called_once_per_fetched_record() {
        let raw = item(
            SourceKind::BechdelApi,
            json!({"title": "Up", "year": 2009, "imdbid": "1049413", "rating": 3}),
        );
        let lookup = CountingLookup { calls: Cell::new(0) };

        let record = normalizer().normalize(&raw, &lookup).unwrap();

        assert_eq!(lookup.calls.get(), 1);
        assert_eq!(record.poster_url.as_deref(), Some("https://img.example/p.jpg"));
    }

    #[test]
    fn test_non_object_item() {
        let raw = item(SourceKind::BechdelApi, json!("just a string"));
        assert_eq!(normalizer().normalize(&raw, &NoPosters), Err(Skip::NotAnObject));
    }

    #[test]
    fn test_truncate_chars_short_text_untouched() {
        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }
}
