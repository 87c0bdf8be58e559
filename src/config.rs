// ⚙️ Pipeline Configuration - Defaults, TOML file, environment
// Precedence (highest first): CLI flags, TMDB_API_KEY, --config file, built-in defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Prior corpus, read at startup
    pub seed_file: PathBuf,

    /// Curated, size-bounded output
    pub core_output: PathBuf,

    /// Full merged output
    pub extended_output: PathBuf,

    /// Optional IMDb list export (CSV)
    pub imdb_csv: Option<PathBuf>,

    /// Version string stamped into both outputs
    pub dataset_version: String,

    pub sources: SourceConfig,
    pub normalize: NormalizeConfig,
    pub core: CoreConfig,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub bechdel_api_url: String,
    pub bechdel_feed_url: String,

    /// Per-request timeout for source fetches
    pub fetch_timeout_secs: u64,

    /// Only the newest N feed entries are read
    pub feed_limit: usize,

    /// Keep only the newest N Bechdel API films (0 = all)
    pub bechdel_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Bechdel rating needed to be kept (3 = passes)
    pub bechdel_min_rating: i64,

    /// Free-text fields are cut to this many characters
    pub description_max_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Explicit recency cutoff; when absent, `current year - recency_years`
    pub min_year: Option<i32>,

    pub recency_years: i32,

    pub max_films: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// TMDb v3 API key; no key means no TMDb calls and no delay
    pub tmdb_api_key: Option<String>,
    pub tmdb_search_url: String,
    pub tmdb_image_base: String,
    pub timeout_secs: u64,

    /// Minimum pause between TMDb calls
    pub min_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            seed_file: PathBuf::from("seed-films.json"),
            core_output: PathBuf::from("core-films.json"),
            extended_output: PathBuf::from("extended-films.json"),
            imdb_csv: None,
            dataset_version: "2.1".to_string(),
            sources: SourceConfig::default(),
            normalize: NormalizeConfig::default(),
            core: CoreConfig::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            bechdel_api_url: "https://bechdeltest.com/api/v1/getAllMovies".to_string(),
            bechdel_feed_url: "https://bechdeltest.com/rss/".to_string(),
            fetch_timeout_secs: 60,
            feed_limit: 100,
            bechdel_limit: 0,
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        NormalizeConfig {
            bechdel_min_rating: 3,
            description_max_chars: 200,
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            min_year: None,
            recency_years: 50,
            max_films: 1500,
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        EnrichmentConfig {
            tmdb_api_key: None,
            tmdb_search_url: "https://api.themoviedb.org/3/search/movie".to_string(),
            tmdb_image_base: "https://image.tmdb.org/t/p/w500".to_string(),
            timeout_secs: 10,
            min_interval_ms: 25,
        }
    }
}

impl CoreConfig {
    /// Recency cutoff for a given calendar year
    pub fn resolve_min_year(&self, current_year: i32) -> i32 {
        self.min_year
            .unwrap_or(current_year - self.recency_years)
    }
}

impl PipelineConfig {
    /// Load from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => PipelineConfig::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(TMDB_API_KEY_ENV) {
            let key = key.trim();
            if !key.is_empty() {
                self.enrichment.tmdb_api_key = Some(key.to_string());
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
