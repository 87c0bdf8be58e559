// Bechdel Test API - getAllMovies
// Returns [{ "title", "year", "imdbid", "rating", "id" }, ...]

use super::{get_checked, RawItem, SourceFetcher, SourceKind};
use crate::error::FetchError;
use serde_json::Value;

pub struct BechdelApiSource {
    client: reqwest::blocking::Client,
    url: String,

    /// Newest N films only (0 = all)
    limit: usize,

    /// Films rated below this never count toward the limit
    min_rating: i64,
}

impl BechdelApiSource {
    pub fn new(
        client: reqwest::blocking::Client,
        url: impl Into<String>,
        limit: usize,
        min_rating: i64,
    ) -> Self {
        BechdelApiSource {
            client,
            url: url.into(),
            limit,
            min_rating,
        }
    }
}

impl SourceFetcher for BechdelApiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::BechdelApi
    }

    fn fetch(&self) -> Result<Vec<RawItem>, FetchError> {
        tracing::info!("Requesting Bechdel Test API (this may take 10-30 seconds)");
        let body: Value = get_checked(&self.client, &self.url)?.json()?;
        parse_movies(body, self.limit, self.min_rating)
    }
}

/// Turn the API body into raw items.
///
/// Films below `min_rating` are dropped first; the newest `limit` of the
/// rest are kept when a limit is set.
pub fn parse_movies(body: Value, limit: usize, min_rating: i64) -> Result<Vec<RawItem>, FetchError> {
    let mut movies = match body {
        Value::Array(movies) => movies,
        _ => return Err(FetchError::Parse("Bechdel API did not return an array".to_string())),
    };

    let total = movies.len();
    movies.retain(|m| int_field(m, "rating") >= min_rating);
    tracing::debug!(total, passing = movies.len(), min_rating, "Filtered Bechdel ratings");

    if limit > 0 {
        movies.sort_by_key(|m| std::cmp::Reverse(int_field(m, "year")));
        movies.truncate(limit);
    }

    Ok(movies
        .into_iter()
        .enumerate()
        .map(|(idx, movie)| RawItem::new(SourceKind::BechdelApi, movie, idx))
        .collect())
}

/// Integer field given as a number or numeric string, 0 otherwise
fn int_field(movie: &Value, key: &str) -> i64 {
    match movie.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_all_movies() {
        let body = json!([
            {"title": "Alien", "year": 1979, "imdbid": "0078748", "rating": 3},
            {"title": "Heat", "year": "1995", "imdbid": "0113277", "rating": 1}
        ]);

        let items = parse_movies(body, 0, 0).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, SourceKind::BechdelApi);
        assert_eq!(items[0].str_field("title"), Some("Alien"));
    }

    #[test]
    fn test_rating_filter_runs_before_limit() {
        let body = json!([
            {"title": "Passes", "year": 1990, "imdbid": "0000001", "rating": 3},
            {"title": "Fails", "year": 2023, "imdbid": "0000002", "rating": 1},
            {"title": "Also Passes", "year": "2001", "imdbid": "0000003", "rating": "3"}
        ]);

        let items = parse_movies(body, 1, 3).unwrap();

        let titles: Vec<_> = items.iter().filter_map(|i| i.str_field("title")).collect();
        assert_eq!(titles, vec!["Also Passes"]);
    }

    #[test]
    fn test_missing_rating_counts_as_zero() {
        let body = json!([{"title": "Unrated", "year": 2020}]);

        assert!(parse_movies(body.clone(), 0, 3).unwrap().is_empty());
        assert_eq!(parse_movies(body, 0, 0).unwrap().len(), 1);
    }

    #[test]
    fn test_limit_keeps_newest() {
        let body = json!([
            {"title": "Old", "year": 1950},
            {"title": "New", "year": "2020"},
            {"title": "Mid", "year": 1990}
        ]);

        let items = parse_movies(body, 2, 0).unwrap();

        let titles: Vec<_> = items.iter().filter_map(|i| i.str_field("title")).collect();
        assert_eq!(titles, vec!["New", "Mid"]);
    }

    #[test]
    fn test_non_array_body_is_a_parse_error() {
        let result = parse_movies(json!({"error": "down"}), 0, 3);
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }
}
