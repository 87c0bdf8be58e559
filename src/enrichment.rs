// 🖼️ Poster Enrichment - (title, year, IMDb id) → poster URL
// Lookups never fail outward; errors are logged and the record has no poster

use crate::config::EnrichmentConfig;
use crate::error::EnrichmentError;
use crate::record::imdb_title_url;
use serde::Deserialize;
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Anything that can find a poster for a film
pub trait PosterLookup {
    fn poster_url(&self, title: &str, year: Option<i32>, imdb_id: Option<&str>) -> Option<String>;

    /// Whether lookups leave the process
    fn is_remote(&self) -> bool {
        false
    }
}

// ============================================================================
// OFFLINE LOOKUPS
// ============================================================================

/// Never finds anything
pub struct NoPosters;

impl PosterLookup for NoPosters {
    fn poster_url(&self, _title: &str, _year: Option<i32>, _imdb_id: Option<&str>) -> Option<String> {
        None
    }
}

/// Links to the IMDb title page when no image service is configured
pub struct ImdbTitleLink;

impl PosterLookup for ImdbTitleLink {
    fn poster_url(&self, _title: &str, _year: Option<i32>, imdb_id: Option<&str>) -> Option<String> {
        imdb_id.map(imdb_title_url)
    }
}

// ============================================================================
// RATE LIMITER
// ============================================================================

/// Blocking minimum-interval limiter for a single thread of control
pub struct RateLimiter {
    last_request: Cell<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        RateLimiter {
            last_request: Cell::new(None),
            min_interval,
        }
    }

    /// Sleep if the previous call was too recent
    pub fn wait(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }
}

// ============================================================================
// TMDB
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    poster_path: Option<String>,
}

/// TMDb movie search (v3 API key)
pub struct TmdbPosterLookup {
    client: reqwest::blocking::Client,
    api_key: String,
    search_url: String,
    image_base: String,
    rate_limiter: RateLimiter,
    unauthorized_reported: Cell<bool>,
}

impl TmdbPosterLookup {
    pub fn new(config: &EnrichmentConfig, api_key: String) -> Result<Self, EnrichmentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(TmdbPosterLookup {
            client,
            api_key,
            search_url: config.tmdb_search_url.clone(),
            image_base: config.tmdb_image_base.clone(),
            rate_limiter: RateLimiter::new(Duration::from_millis(config.min_interval_ms)),
            unauthorized_reported: Cell::new(false),
        })
    }

    /// One rate-limited search call
    pub fn search(&self, title: &str, year: Option<i32>) -> Result<Option<String>, EnrichmentError> {
        self.rate_limiter.wait();

        let mut query = vec![("api_key", self.api_key.clone()), ("query", title.to_string())];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }

        let response = self.client.get(&self.search_url).query(&query).send()?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(EnrichmentError::Unauthorized);
        }
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .map_err(|e| EnrichmentError::Parse(e.to_string()))?;

        Ok(poster_from_results(&body, &self.image_base))
    }
}

fn poster_from_results(body: &SearchResponse, image_base: &str) -> Option<String> {
    body.results
        .first()
        .and_then(|r| r.poster_path.as_deref())
        .map(|path| format!("{}{}", image_base, path))
}

impl PosterLookup for TmdbPosterLookup {
    fn poster_url(&self, title: &str, year: Option<i32>, _imdb_id: Option<&str>) -> Option<String> {
        match self.search(title, year) {
            Ok(url) => url,
            Err(EnrichmentError::Unauthorized) => {
                if !self.unauthorized_reported.replace(true) {
                    tracing::warn!(
                        "TMDb returned 401 Unauthorized - use the 'API Key (v3 auth)', \
                         not the 'API Read Access Token' (https://www.themoviedb.org/settings/api)"
                    );
                }
                None
            }
            Err(e) => {
                tracing::warn!(title = %title, error = %e, "TMDb lookup failed");
                None
            }
        }
    }

    fn is_remote(&self) -> bool {
        true
    }
}

/// TMDb when a key is configured, IMDb title link otherwise
pub fn poster_lookup_for(config: &EnrichmentConfig) -> Box<dyn PosterLookup> {
    match &config.tmdb_api_key {
        Some(key) => match TmdbPosterLookup::new(config, key.clone()) {
            Ok(lookup) => Box::new(lookup),
            Err(e) => {
                tracing::warn!(error = %e, "TMDb client unavailable, falling back to IMDb links");
                Box::new(ImdbTitleLink)
            }
        },
        None => Box::new(ImdbTitleLink),
    }
}

// ============================================================================
// TESTS
// ============================================================================
