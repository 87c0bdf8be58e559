// 📊 Corpus Statistics - Totals, sources, decades, metadata coverage

use crate::dataset::source_counts;
use crate::record::FilmRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub with_runtime: usize,
    pub with_imdb_id: usize,
    pub with_directors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub total_films: usize,
    pub duplicates_removed: usize,
    pub by_source: BTreeMap<String, usize>,
    pub without_poster: usize,

    /// (min, max) over dated films
    pub year_range: Option<(i32, i32)>,

    /// Decade start → count, dated films only
    pub by_decade: BTreeMap<i32, usize>,

    pub coverage: Coverage,
}

impl CorpusStats {
    pub fn from_records(records: &[FilmRecord], duplicates_removed: usize) -> Self {
        let mut by_decade = BTreeMap::new();
        let mut year_range: Option<(i32, i32)> = None;

        for year in records.iter().filter_map(|r| r.year) {
            *by_decade.entry(year.div_euclid(10) * 10).or_insert(0) += 1;
            year_range = Some(match year_range {
                Some((lo, hi)) => (lo.min(year), hi.max(year)),
                None => (year, year),
            });
        }

        CorpusStats {
            total_films: records.len(),
            duplicates_removed,
            by_source: source_counts(records),
            without_poster: records.iter().filter(|r| r.poster_url.is_none()).count(),
            year_range,
            by_decade,
            coverage: Coverage {
                with_runtime: records.iter().filter(|r| r.runtime.is_some()).count(),
                with_imdb_id: records.iter().filter(|r| r.external_id.is_some()).count(),
                with_directors: records.iter().filter(|r| !r.directors.is_empty()).count(),
            },
        }
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} films ({} duplicates removed) from {} sources | {} without poster",
            self.total_films,
            self.duplicates_removed,
            self.by_source.len(),
            self.without_poster
        )
    }

    pub fn percent(&self, count: usize) -> f64 {
        if self.total_films == 0 {
            0.0
        } else {
            count as f64 / self.total_films as f64 * 100.0
        }
    }
}

impl fmt::Display for CorpusStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{}", rule)?;
        writeln!(f, "DATASET STATISTICS")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Total films: {}", self.total_films)?;
        writeln!(f, "Duplicates removed: {}", self.duplicates_removed)?;

        writeln!(f, "\n📁 Films by source:")?;
        let mut sources: Vec<_> = self.by_source.iter().collect();
        sources.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (source, count) in sources {
            writeln!(f, "  {:20} {:5} ({:5.1}%)", source, count, self.percent(*count))?;
        }

        writeln!(f, "\nFilms without poster URLs: {}", self.without_poster)?;
        if let Some((lo, hi)) = self.year_range {
            writeln!(f, "Year range: {} - {}", lo, hi)?;
        }

        if !self.by_decade.is_empty() {
            writeln!(f, "\n📅 Films by decade:")?;
            for (decade, count) in &self.by_decade {
                writeln!(f, "  {}s: {:5}", decade, count)?;
            }
        }

        writeln!(f, "\n📝 Metadata coverage:")?;
        for (label, count) in [
            ("runtime", self.coverage.with_runtime),
            ("IMDb ID", self.coverage.with_imdb_id),
            ("directors", self.coverage.with_directors),
        ] {
            writeln!(f, "  With {:10} {:5} ({:5.1}%)", label, count, self.percent(count))?;
        }

        write!(f, "{}", rule)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_tag::SourceTag;

    fn film(id: &str, year: Option<i32>, source: &str) -> FilmRecord {
        FilmRecord::new(id.to_string(), id.to_string(), SourceTag::parse(source)).with_year(year)
    }

    fn sample() -> Vec<FilmRecord> {
        let mut a = film("a", Some(1972), "seed");
        a.runtime = Some(175);
        a.directors = vec!["Francis Ford Coppola".to_string()];
        a.poster_url = Some("https://img.example/a.jpg".to_string());

        let b = film("b", Some(1979), "bechdel").with_external_id(Some("tt0078748".to_string()));
        let c = film("c", Some(2009), "bechdel");
        let d = film("d", None, "oscars");

        vec![a, b, c, d]
    }

    #[test]
    fn test_counts() {
        let stats = CorpusStats::from_records(&sample(), 2);

        assert_eq!(stats.total_films, 4);
        assert_eq!(stats.duplicates_removed, 2);
        assert_eq!(stats.by_source["bechdel"], 2);
        assert_eq!(stats.by_source["seed"], 1);
        assert_eq!(stats.without_poster, 3);
        assert_eq!(stats.year_range, Some((1972, 2009)));
    }

    #[test]
    fn test_decades_skip_missing_years() {
        let stats = CorpusStats::from_records(&sample(), 0);

        assert_eq!(stats.by_decade.get(&1970), Some(&2));
        assert_eq!(stats.by_decade.get(&2000), Some(&1));
        assert_eq!(stats.by_decade.values().sum::<usize>(), 3);
    }

    #[test]
    fn test_coverage() {
        let stats = CorpusStats::from_records(&sample(), 0);

        assert_eq!(stats.coverage.with_runtime, 1);
        assert_eq!(stats.coverage.with_imdb_id, 1);
        assert_eq!(stats.coverage.with_directors, 1);
        assert!((stats.percent(1) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_corpus() {
        let stats = CorpusStats::from_records(&[], 0);

        assert_eq!(stats.year_range, None);
        assert_eq!(stats.percent(0), 0.0);
        assert!(stats.to_string().contains("Total films: 0"));
    }

    #[test]
    fn test_report_lists_sources() {
        let report = CorpusStats::from_records(&sample(), 1).to_string();

        assert!(report.contains("Duplicates removed: 1"));
        assert!(report.contains("bechdel"));
        assert!(report.contains("Year range: 1972 - 2009"));
        assert!(report.contains("1970s"));
    }
}
