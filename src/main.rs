use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use film_corpus::{Pipeline, PipelineConfig, RunMode, RunReport};

/// Build the core and extended film datasets from all sources
#[derive(Parser, Debug)]
#[command(name = "film-corpus")]
#[command(about = "Expand the film dataset from multiple sources")]
#[command(version)]
struct Args {
    /// Show statistics only (local data, nothing written)
    #[arg(long, conflicts_with_all = ["merge_only", "no_fetch"])]
    stats: bool,

    /// Only organize existing data, don't fetch new data
    #[arg(long)]
    merge_only: bool,

    /// Skip API fetching, just organize existing data
    #[arg(long)]
    no_fetch: bool,

    /// TOML config file
    #[arg(short, long, env = "FILM_CORPUS_CONFIG")]
    config: Option<PathBuf>,

    /// Seed dataset (read at startup)
    #[arg(long)]
    seed: Option<PathBuf>,

    #[arg(long)]
    core_output: Option<PathBuf>,

    #[arg(long)]
    extended_output: Option<PathBuf>,

    /// IMDb list export (CSV) to import
    #[arg(long)]
    imdb_csv: Option<PathBuf>,

    /// Maximum size of the core dataset
    #[arg(long)]
    core_max: Option<usize>,

    /// Recency cutoff for the core dataset (default: 50 years back)
    #[arg(long)]
    core_min_year: Option<i32>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn mode(&self) -> RunMode {
        if self.stats {
            RunMode::StatsOnly
        } else if self.merge_only || self.no_fetch {
            RunMode::MergeOnly
        } else {
            RunMode::Full
        }
    }

    /// CLI flags override file and environment
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(seed) = &self.seed {
            config.seed_file = seed.clone();
        }
        if let Some(path) = &self.core_output {
            config.core_output = path.clone();
        }
        if let Some(path) = &self.extended_output {
            config.extended_output = path.clone();
        }
        if let Some(path) = &self.imdb_csv {
            config.imdb_csv = Some(path.clone());
        }
        if let Some(max) = self.core_max {
            config.core.max_films = max;
        }
        if let Some(year) = self.core_min_year {
            config.core.min_year = Some(year);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "film_corpus=debug" } else { "film_corpus=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = PipelineConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    let mode = args.mode();

    println!("🎬 Film Corpus - Dataset Expander");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if mode.fetches_remote() && config.enrichment.tmdb_api_key.is_none() {
        println!("ℹ️  TMDB_API_KEY not set - poster URLs will link to IMDb pages");
    }

    let pipeline = Pipeline::from_config(config.clone(), mode);
    let report = pipeline.run()?;

    print_report(&report, &config);
    Ok(())
}

fn print_report(report: &RunReport, config: &PipelineConfig) {
    println!("\n📥 Sources:");
    for source in &report.sources {
        println!("  {}", source.summary());
    }

    println!("\n{}", report.stats);

    if report.core_trimmed > 0 {
        println!(
            "\n✂️  Core trimmed by {} films to stay within {}",
            report.core_trimmed, config.core.max_films
        );
    }
    println!("\n📊 {}", report.summary());

    if report.written {
        println!("\n✅ Done! Two datasets created:");
        println!("   📁 {} - Default (recognizable films)", config.core_output.display());
        println!("   📁 {} - Full collection (all sources)", config.extended_output.display());
    } else {
        println!("\nℹ️  Statistics only - no files written");
    }
}
