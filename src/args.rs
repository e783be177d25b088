use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "serptrack",
    about = "Analyze SERP position-tracking exports for keyword and domain performance",
    version,
    long_about = None
)]
pub struct Args {
    /// Ranking export to analyze (CSV or TSV with a header row)
    pub file: PathBuf,

    /// Show analytics for a single keyword
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Show analytics for a single domain
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Comparison start date, YYYY-MM-DD (requires --keyword and --to)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Comparison end date, YYYY-MM-DD (requires --keyword and --from)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Emit results as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of worker threads for ingestion
    #[arg(short, long)]
    pub workers: Option<usize>,
}
