// 🎬 Pipeline - One run: fetch → normalize → merge → core filter → write
// Sources run in a fixed order and fail independently

use crate::config::PipelineConfig;
use crate::core_filter::CoreFilter;
use crate::dataset::{DatasetKind, DatasetWriter};
use crate::enrichment::{poster_lookup_for, ImdbTitleLink, PosterLookup};
use crate::merge::MergeEngine;
use crate::normalizer::Normalizer;
use crate::sources::{
    http_client, BechdelApiSource, BechdelFeedSource, ImdbListSource, SeedFileSource,
    SourceFetcher, SourceKind,
};
use crate::stats::CorpusStats;
use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// RUN MODE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunMode {
    /// Fetch everything, merge, write both datasets
    Full,

    /// Local data only, print statistics, write nothing
    StatsOnly,

    /// Local data only, merge and write
    MergeOnly,
}

impl RunMode {
    pub fn fetches_remote(&self) -> bool {
        matches!(self, RunMode::Full)
    }

    pub fn writes_output(&self) -> bool {
        !matches!(self, RunMode::StatsOnly)
    }
}

// ============================================================================
// REPORTS
// ============================================================================

/// What one source contributed
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub kind: SourceKind,
    pub fetched: usize,
    pub accepted: usize,
    pub skipped: usize,

    /// Set when the fetch failed and the source contributed nothing
    pub error: Option<String>,
}

impl SourceReport {
    fn new(kind: SourceKind) -> Self {
        SourceReport {
            kind,
            fetched: 0,
            accepted: 0,
            skipped: 0,
            error: None,
        }
    }

    pub fn summary(&self) -> String {
        match &self.error {
            Some(error) => format!("{:18} failed: {}", self.kind.name(), error),
            None => format!(
                "{:18} {:5} fetched, {:5} accepted, {:4} skipped",
                self.kind.name(),
                self.fetched,
                self.accepted,
                self.skipped
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub mode: RunMode,
    pub sources: Vec<SourceReport>,
    pub duplicates: usize,
    pub extended_total: usize,
    pub core_total: usize,
    pub core_trimmed: usize,
    pub core_min_year: i32,

    /// Whether both datasets were written
    pub written: bool,

    pub stats: CorpusStats,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "Core dataset: {} films (recent {}+ and classics) | Extended dataset: {} films | {} duplicates removed",
            self.core_total, self.core_min_year, self.extended_total, self.duplicates
        )
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    config: PipelineConfig,
    mode: RunMode,
    fetchers: Vec<Box<dyn SourceFetcher>>,
    posters: Box<dyn PosterLookup>,
    normalizer: Normalizer,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        mode: RunMode,
        fetchers: Vec<Box<dyn SourceFetcher>>,
        posters: Box<dyn PosterLookup>,
    ) -> Self {
        let normalizer = Normalizer::new(&config.normalize);
        Pipeline {
            config,
            mode,
            fetchers,
            posters,
            normalizer,
        }
    }

    /// Standard source order: seed, Bechdel API, Bechdel feed, IMDb export.
    ///
    /// Remote sources and TMDb posters only in `Full` mode.
    pub fn from_config(config: PipelineConfig, mode: RunMode) -> Self {
        let mut fetchers: Vec<Box<dyn SourceFetcher>> =
            vec![Box::new(SeedFileSource::new(config.seed_file.clone()))];

        if mode.fetches_remote() {
            let timeout = Duration::from_secs(config.sources.fetch_timeout_secs);
            match http_client(timeout) {
                Ok(client) => {
                    fetchers.push(Box::new(BechdelApiSource::new(
                        client.clone(),
                        config.sources.bechdel_api_url.clone(),
                        config.sources.bechdel_limit,
                        config.normalize.bechdel_min_rating,
                    )));
                    fetchers.push(Box::new(BechdelFeedSource::new(
                        client,
                        config.sources.bechdel_feed_url.clone(),
                        config.sources.feed_limit,
                    )));
                }
                Err(e) => tracing::warn!(error = %e, "HTTP client unavailable, skipping remote sources"),
            }
        }

        if let Some(path) = &config.imdb_csv {
            fetchers.push(Box::new(ImdbListSource::new(path.clone())));
        }

        let posters: Box<dyn PosterLookup> = if mode.fetches_remote() {
            poster_lookup_for(&config.enrichment)
        } else {
            Box::new(ImdbTitleLink)
        };

        Self::new(config, mode, fetchers, posters)
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn run(&self) -> Result<RunReport> {
        self.run_for_year(Local::now().year())
    }

    /// Run with an explicit calendar year for the recency cutoff
    pub fn run_for_year(&self, current_year: i32) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id, mode = ?self.mode);
        let _enter = span.enter();

        let mut merger = MergeEngine::new();
        let mut sources = Vec::with_capacity(self.fetchers.len());

        for fetcher in &self.fetchers {
            sources.push(self.ingest(fetcher.as_ref(), &mut merger));
        }

        let duplicates = merger.duplicate_count();
        tracing::info!(
            films = merger.len(),
            duplicates,
            "Merged sources"
        );

        let extended = merger.into_records();
        let filter = CoreFilter::from_config(&self.config.core, current_year);
        let core = filter.apply(&extended);

        let mut written = false;
        if self.mode.writes_output() {
            let writer = DatasetWriter::new(self.config.dataset_version.clone());
            let core_dataset = writer.build(
                &core.films,
                DatasetKind::Core,
                &DatasetKind::Core.description(filter.min_year),
            );
            let extended_dataset = writer.build(
                &extended,
                DatasetKind::Extended,
                &DatasetKind::Extended.description(filter.min_year),
            );

            writer
                .write_pair(
                    (&core_dataset, &self.config.core_output),
                    (&extended_dataset, &self.config.extended_output),
                )
                .context("Failed to write datasets")?;
            written = true;
        }

        Ok(RunReport {
            run_id,
            mode: self.mode,
            sources,
            duplicates,
            extended_total: extended.len(),
            core_total: core.films.len(),
            core_trimmed: core.trimmed,
            core_min_year: filter.min_year,
            written,
            stats: CorpusStats::from_records(&extended, duplicates),
        })
    }

    /// Fetch one source and feed its records to the merger
    fn ingest(&self, fetcher: &dyn SourceFetcher, merger: &mut MergeEngine) -> SourceReport {
        let kind = fetcher.kind();
        let mut report = SourceReport::new(kind);

        let items = match fetcher.fetch() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(source = kind.name(), error = %e, "Source fetch failed");
                report.error = Some(e.to_string());
                return report;
            }
        };

        report.fetched = items.len();
        for item in &items {
            match self.normalizer.normalize(item, self.posters.as_ref()) {
                Ok(record) => {
                    merger.insert(record);
                    report.accepted += 1;
                }
                Err(skip) => {
                    tracing::debug!(source = kind.name(), position = item.position, reason = %skip, "Skipped item");
                    report.skipped += 1;
                }
            }
        }

        tracing::info!(
            source = kind.name(),
            fetched = report.fetched,
            accepted = report.accepted,
            skipped = report.skipped,
            "Source ingested"
        );
        report
    }
}

// ============================================================================
// TESTS
// ============================================================================
