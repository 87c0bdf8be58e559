// Film Corpus - Core Library
// Aggregates film metadata from several sources into core and extended datasets

pub mod source_tag;     // Tag table: rank + class per source
pub mod record;         // FilmRecord wire model
pub mod identity;       // Match keys and fallback identities
pub mod sources;        // Fetchers: seed, Bechdel API, Bechdel RSS, IMDb export
pub mod normalizer;     // Raw item → FilmRecord
pub mod enrichment;     // Poster lookups (TMDb, IMDb link)
pub mod merge;          // Priority-based dedup
pub mod core_filter;    // Recognizable subset
pub mod dataset;        // Dataset writer/reader
pub mod stats;          // Corpus statistics
pub mod config;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use source_tag::{KnownSource, SourceClass, SourceTag, UNRANKED};
pub use record::FilmRecord;
pub use identity::{fallback_identity, match_key, MatchKey};
pub use sources::{RawItem, SourceFetcher, SourceKind};
pub use normalizer::{Normalizer, Skip};
pub use enrichment::{ImdbTitleLink, NoPosters, PosterLookup, TmdbPosterLookup};
pub use merge::{Collision, MergeEngine, MergeOutcome};
pub use core_filter::{CoreFilter, CoreReason, CoreSelection};
pub use dataset::{read_dataset, Dataset, DatasetKind, DatasetWriter};
pub use stats::CorpusStats;
pub use config::PipelineConfig;
pub use error::{DatasetError, EnrichmentError, FetchError};
pub use pipeline::{Pipeline, RunMode, RunReport, SourceReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
