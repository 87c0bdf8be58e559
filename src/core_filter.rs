// 🎯 Core Filter - Recognizable subset of the merged corpus
// Classics always, recent films, thematic curated lists; capped by recency

use crate::config::CoreConfig;
use crate::record::FilmRecord;
use crate::source_tag::SourceClass;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

// ============================================================================
// INCLUSION REASON
// ============================================================================

/// Why a record made it into core (first matching rule)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreReason {
    /// Curated classic source (oscars, afi-classics, popular)
    ClassicSource,

    /// Year at or after the recency cutoff
    Recent,

    /// Curated thematic list, any year
    ThematicSource,
}

// ============================================================================
// SELECTION
// ============================================================================

#[derive(Debug, Clone)]
pub struct CoreSelection {
    pub films: Vec<FilmRecord>,

    /// Records that passed a rule before the size cap
    pub candidates: usize,

    /// Records removed by the size cap
    pub trimmed: usize,
}

// ============================================================================
// CORE FILTER
// ============================================================================

pub struct CoreFilter {
    /// Inclusive recency cutoff
    pub min_year: i32,

    pub max_films: usize,
}

impl CoreFilter {
    pub fn new(min_year: i32, max_films: usize) -> Self {
        CoreFilter {
            min_year,
            max_films,
        }
    }

    pub fn from_config(config: &CoreConfig, current_year: i32) -> Self {
        Self::new(config.resolve_min_year(current_year), config.max_films)
    }

    /// First rule a record satisfies, or None if it stays out of core
    pub fn classify(&self, record: &FilmRecord) -> Option<CoreReason> {
        let class = record.source.class();

        if class == SourceClass::Classic {
            return Some(CoreReason::ClassicSource);
        }

        if matches!(record.year, Some(year) if year >= self.min_year) {
            return Some(CoreReason::Recent);
        }

        if class == SourceClass::Thematic {
            return Some(CoreReason::ThematicSource);
        }

        None
    }

    /// Filter and cap.
    ///
    /// Over the cap, candidates are stable-sorted newest first (no year sorts
    /// as oldest) and the tail is dropped, so equal years keep input order.
    pub fn apply(&self, records: &[FilmRecord]) -> CoreSelection {
        let mut films: Vec<FilmRecord> = records
            .iter()
            .filter(|record| self.classify(record).is_some())
            .cloned()
            .collect();

        let candidates = films.len();
        let mut trimmed = 0;

        if films.len() > self.max_films {
            tracing::info!(from = films.len(), to = self.max_films, "Trimming core dataset");
            films.sort_by_key(|record| Reverse(record.year));
            trimmed = films.len() - self.max_films;
            films.truncate(self.max_films);
        }

        CoreSelection {
            films,
            candidates,
            trimmed,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_tag::SourceTag;

    fn film(identity: &str, year: Option<i32>, source: &str) -> FilmRecord {
        FilmRecord::new(identity.to_string(), identity.to_string(), SourceTag::parse(source))
            .with_year(year)
    }

    fn filter() -> CoreFilter {
        CoreFilter::from_config(
            &CoreConfig {
                min_year: Some(1974),
                ..CoreConfig::default()
            },
            2024,
        )
    }

    #[test]
    fn test_old_unranked_excluded_old_classic_included() {
        let f = filter();

        assert_eq!(f.classify(&film("a", Some(1960), "unrated")), None);
        assert_eq!(
            f.classify(&film("b", Some(1960), "oscars")),
            Some(CoreReason::ClassicSource)
        );
    }

    #[test]
    fn test_rule_order() {
        let f = filter();

        assert_eq!(
            f.classify(&film("a", Some(2000), "popular")),
            Some(CoreReason::ClassicSource)
        );
        assert_eq!(f.classify(&film("b", Some(1974), "bechdel")), Some(CoreReason::Recent));
        assert_eq!(f.classify(&film("c", Some(1973), "bechdel")), None);
        assert_eq!(
            f.classify(&film("d", Some(1950), "documentary")),
            Some(CoreReason::ThematicSource)
        );
        assert_eq!(
            f.classify(&film("e", None, "fantasy")),
            Some(CoreReason::ThematicSource)
        );
        assert_eq!(f.classify(&film("f", None, "seed")), None);
        assert_eq!(f.classify(&film("g", None, "bechdel-rss")), None);
    }

    #[test]
    fn test_recency_defaults_to_fifty_years() {
        let f = CoreFilter::from_config(&CoreConfig::default(), 2024);
        assert_eq!(f.min_year, 1974);
    }

    #[test]
    fn test_monotonic_without_cap() {
        let f = filter();
        let records = vec![
            film("a", Some(1960), "unrated"),
            film("b", Some(1960), "oscars"),
            film("c", Some(1999), "imdb-list"),
            film("d", None, "lgbtq"),
            film("e", None, "bechdel"),
        ];

        let selection = f.apply(&records);

        let ids: Vec<_> = selection.films.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
        assert_eq!(selection.candidates, 3);
        assert_eq!(selection.trimmed, 0);
    }

    #[test]
    fn test_cap_keeps_newest() {
        // 1600 candidates, years spread over 1900..=2059 with some missing
        let records: Vec<FilmRecord> = (0..1600)
            .map(|i| {
                let year = if i % 50 == 0 { None } else { Some(1900 + (i % 160) as i32) };
                film(&format!("f{}", i), year, "oscars")
            })
            .collect();
        let f = CoreFilter::new(1974, 1500);

        let selection = f.apply(&records);

        assert_eq!(selection.films.len(), 1500);
        assert_eq!(selection.candidates, 1600);
        assert_eq!(selection.trimmed, 100);

        // Everything kept is at least as new as everything dropped
        let oldest_kept = selection.films.iter().map(|r| r.year).min().unwrap();
        let kept: std::collections::HashSet<_> =
            selection.films.iter().map(|r| r.identity.clone()).collect();
        for dropped in records.iter().filter(|r| !kept.contains(&r.identity)) {
            assert!(dropped.year <= oldest_kept);
        }
        // 32 records without a year are the first to go
        assert!(selection.films.iter().all(|r| r.year.is_some()));
    }

    #[test]
    fn test_cap_ties_keep_input_order() {
        let records = vec![
            film("a", Some(2000), "oscars"),
            film("b", Some(2010), "oscars"),
            film("c", Some(2000), "oscars"),
            film("d", Some(2000), "oscars"),
        ];
        let f = CoreFilter::new(1974, 3);

        let selection = f.apply(&records);

        let ids: Vec<_> = selection.films.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_cap_is_deterministic() {
        let records: Vec<FilmRecord> = (0..40)
            .map(|i| film(&format!("f{}", i), Some(1980 + (i % 7)), "bechdel"))
            .collect();
        let f = CoreFilter::new(1974, 25);

        let first = f.apply(&records);
        let second = f.apply(&records);

        assert_eq!(first.films, second.films);
    }
}
