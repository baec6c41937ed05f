use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use rankscope_client::{ItunesClient, ItunesConfig, LlmKeywordSource, SuggestConfig};
use rankscope_core::batch::{BatchKeyword, BatchRunner};
use rankscope_core::persist::{load_json, save_json, RunStore};
use rankscope_core::{Detail, Engine, EngineConfig, Storefront};

#[derive(Parser)]
#[command(name = "rankscope")]
#[command(about = "Keyword ranking and competitive analysis for app marketplace listings", long_about = None)]
struct Cli {
    /// Two-letter storefront code
    #[arg(long, global = true, default_value = "us")]
    storefront: String,
    /// Record keyword analyses into this run store directory
    #[arg(long, global = true)]
    record: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find an app's rank for one keyword
    Rank {
        #[arg(long)]
        app_id: u64,
        #[arg(long)]
        keyword: String,
    },
    /// Competitiveness of a keyword's top 20 results
    Analyze { keyword: String },
    /// Apps that keep showing up next to this one
    Competitors {
        #[arg(long)]
        app_id: u64,
    },
    /// Check an app's rank across generated keywords
    Rankings {
        #[arg(long)]
        app_id: u64,
        /// Maximum number of keywords to test
        #[arg(long)]
        limit: Option<usize>,
        /// Sort best rank first instead of generation order
        #[arg(long, default_value_t = false)]
        minimal: bool,
    },
    /// Compare up to 10 keywords and recommend the least competitive
    Compare {
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Category momentum from the new free and paid charts
    Trending {
        /// Chart genre id to restrict to
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// List generated keywords with their origin
    Keywords {
        #[arg(long)]
        app_id: u64,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Analyze every keyword in a JSON file
    Batch {
        /// JSON array of objects with at least a `search_term`
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "./output/keyword_analysis.json")]
        output: PathBuf,
        /// Pause between keywords, in seconds
        #[arg(long, default_value_t = 2.0)]
        delay_secs: f64,
        /// Continue from the checkpoint next to the output file
        #[arg(long, default_value_t = false)]
        resume: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_engine() -> Result<Engine> {
    let client = Arc::new(ItunesClient::new(ItunesConfig::default()).context("building marketplace client")?);
    let mut engine = Engine::new(client.clone(), client.clone(), client, EngineConfig::from_env());
    if let Some(cfg) = SuggestConfig::from_env() {
        tracing::info!(url = %cfg.base_url, model = %cfg.model, "keyword suggestions enabled");
        engine = engine.with_keyword_source(Arc::new(LlmKeywordSource::new(cfg)?));
    }
    Ok(engine)
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let storefront: Storefront = cli.storefront.parse()?;
    let engine = build_engine()?;
    let store = match &cli.record {
        Some(dir) => Some(RunStore::open(dir).with_context(|| format!("opening run store at {}", dir.display()))?),
        None => None,
    };

    match cli.command {
        Commands::Rank { app_id, keyword } => print_json(&engine.find_app_rank(app_id, &keyword, &storefront).await?),
        Commands::Analyze { keyword } => {
            let analysis = engine.analyze_keyword(&keyword, &storefront).await?;
            if let Some(store) = &store {
                store.record(&analysis)?;
            }
            print_json(&analysis)
        }
        Commands::Competitors { app_id } => print_json(&engine.app_competitors(app_id, &storefront).await?),
        Commands::Rankings { app_id, limit, minimal } => {
            let detail = if minimal { Detail::Minimal } else { Detail::Full };
            print_json(&engine.check_app_rankings(app_id, limit, &storefront, detail).await?)
        }
        Commands::Compare { keywords } => print_json(&engine.compare_keywords(&keywords, &storefront).await?),
        Commands::Trending { category, limit } => {
            print_json(&engine.discover_trending(category.as_deref(), &storefront, limit).await?)
        }
        Commands::Keywords { app_id, limit } => {
            let app = engine.lookup_app(app_id, &storefront).await?;
            print_json(&engine.generate_keywords(&app, limit).await)
        }
        Commands::Batch { input, output, delay_secs, resume } => {
            run_batch(&engine, store.as_ref(), storefront, &input, &output, delay_secs, resume).await
        }
    }
}

async fn run_batch(
    engine: &Engine,
    store: Option<&RunStore>,
    storefront: Storefront,
    input: &Path,
    output: &Path,
    delay_secs: f64,
    resume: bool,
) -> Result<()> {
    let keywords: Vec<BatchKeyword> =
        load_json(input).with_context(|| format!("reading keywords from {}", input.display()))?;
    tracing::info!(count = keywords.len(), input = %input.display(), "loaded keywords");

    let checkpoint = output.with_file_name("checkpoint.json");
    if !resume && checkpoint.exists() {
        std::fs::remove_file(&checkpoint)?;
    }
    let mut runner = BatchRunner::new(engine, storefront)
        .delay(Duration::from_secs_f64(delay_secs.max(0.0)))
        .checkpoint(&checkpoint);
    if let Some(store) = store {
        runner = runner.record_to(store);
    }
    let report = runner.run(&keywords).await?;
    save_json(output, &report).with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(
        output = %output.display(),
        successful = report.metadata.successful,
        failed = report.metadata.failed,
        "batch report written"
    );

    if checkpoint.exists() {
        std::fs::remove_file(&checkpoint)?;
    }
    Ok(())
}
