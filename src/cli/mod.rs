mod render;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use tokdash::logging::init_logging;
use tokdash::parsers::UsageCsvParser;
use tokdash::services::{export_url, top_models, Aggregator, CalendarGrid, DEFAULT_TOP_MODELS};
use tokdash::types::{TokdashError, UsageLog};

/// Shown when an export parses to zero records
const NO_RECORDS_MESSAGE: &str = "No valid records found. Please check your CSV format.";

/// Cost & token analytics for AI coding-assistant usage exports
#[derive(Parser)]
#[command(name = "tokdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print parse diagnostics (TOKDASH_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Usage export CSV file
    file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Totals: cost, tokens, requests, models, date range
    Summary(ReportArgs),

    /// Cost and tokens per day
    Daily(ReportArgs),

    /// Cost per model, ranked
    Models {
        #[command(flatten)]
        report: ReportArgs,

        /// Number of models to show
        #[arg(long, default_value_t = DEFAULT_TOP_MODELS)]
        top: usize,
    },

    /// Calendar heatmap of daily cost
    Heatmap(ReportArgs),

    /// Daily input / cache-read / output token breakdown
    Tokens(ReportArgs),

    /// Build an export link for a custom date range (local time)
    Link {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        init_logging(self.verbose);

        match self.command {
            Commands::Summary(args) => {
                let log = load(&args.file)?;
                let stats = Aggregator::stats(&log);
                emit(args.json, &stats, || render::summary(&stats))
            }
            Commands::Daily(args) => {
                let log = load(&args.file)?;
                let daily = Aggregator::daily(&log);
                emit(args.json, &daily, || render::daily(&daily))
            }
            Commands::Models { report, top } => {
                let log = load(&report.file)?;
                let ranked = Aggregator::by_model(&log);
                let total_cost: f64 = ranked.iter().map(|m| m.total_cost).sum();
                let shown = top_models(&ranked, top);
                emit(report.json, &shown, || render::models(shown, total_cost))
            }
            Commands::Heatmap(args) => {
                let log = load(&args.file)?;
                let grid = CalendarGrid::build(&log);
                emit(args.json, &grid, || render::heatmap(&grid))
            }
            Commands::Tokens(args) => {
                let log = load(&args.file)?;
                let composition = Aggregator::token_composition(&log);
                emit(args.json, &composition, || render::tokens(&composition))
            }
            Commands::Link { from, to } => {
                println!("{}", export_url(from, to, &Local)?);
                Ok(())
            }
        }
    }
}

/// Read and parse an export, mapping an empty result to the user-facing notice
fn load(path: &Path) -> anyhow::Result<UsageLog> {
    let report = UsageCsvParser::new()
        .parse_file(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if !report.skipped.is_empty() {
        tracing::info!(
            skipped = report.skipped.len(),
            file = %path.display(),
            "some rows were skipped"
        );
    }

    report.into_log().map_err(|err| match err {
        TokdashError::NoValidRecords => anyhow!(NO_RECORDS_MESSAGE),
        other => other.into(),
    })
}

fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}
