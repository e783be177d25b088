use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use serptrack::report::{
    self, ComparisonReport, DomainReport, KeywordReport, SummaryReport,
};
use serptrack::utils::{self, format_number};
use serptrack::{ingest, stats, Args, DatasetStore, IngestReport};

fn emit<T: Serialize>(json: bool, value: &T, render: impl Fn(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        render(value);
    }
    Ok(())
}

fn print_ingest(report: &IngestReport) {
    println!(
        "Rows: {} read, {} kept, {} dropped",
        format_number(report.rows_read as u64),
        format_number(report.rows_kept as u64),
        format_number(report.rows_dropped as u64)
    );
}

fn print_summary(report: &SummaryReport) {
    println!(
        "Keywords: {} | Domains: {} | URL observations: {}",
        format_number(report.total_keywords as u64),
        format_number(report.total_domains as u64),
        format_number(report.total_urls as u64)
    );
    println!("Date range: {} to {}", report.date_range.0, report.date_range.1);

    if let Some(series) = report
        .charts
        .iter()
        .find(|s| s.name == "position_distribution")
    {
        println!("\nPosition distribution:");
        for point in &series.points {
            println!("- {}: {}", point.label, format_number(point.value as u64));
        }
    }

    println!("\nTop domains by average position:");
    for row in &report.top_domains {
        println!(
            "- {}: {:.2} avg (best {}, worst {}, {} observations)",
            row.key, row.mean, row.min, row.max, row.count
        );
    }

    println!("\nTop keywords by volume:");
    for row in &report.keyword_volume {
        println!("- {}: {}", row.key, format_number(row.count as u64));
    }

    println!("\nTop domains by frequency:");
    for row in &report.domain_frequency {
        println!("- {}: {}", row.key, format_number(row.count as u64));
    }
}

fn print_keyword(report: &KeywordReport) {
    println!(
        "Keyword: {} ({} observations)",
        report.keyword,
        format_number(report.observations as u64)
    );

    if let Some(series) = report
        .charts
        .iter()
        .find(|s| s.name == "position_distribution")
    {
        println!("\nPosition distribution:");
        for point in &series.points {
            println!("- {}: {}", point.label, format_number(point.value as u64));
        }
    }

    println!("\nDomain ranking (best average position first):");
    for row in &report.domain_ranking {
        println!(
            "- {}: {:.2} avg (best {}, worst {}, {} observations)",
            row.key, row.mean, row.min, row.max, row.count
        );
    }
}

fn print_domain(report: &DomainReport) {
    println!(
        "Domain: {} ({} observations)",
        report.domain,
        format_number(report.observations as u64)
    );

    println!("\nKeyword ranking (best average position first):");
    for row in &report.keyword_ranking {
        println!(
            "- {}: {:.2} avg (best {}, worst {}, {} observations)",
            row.key, row.mean, row.min, row.max, row.count
        );
    }
}

fn print_comparison(report: &ComparisonReport) {
    println!(
        "Keyword: {} | {} vs {}",
        report.keyword, report.start_date, report.end_date
    );
    println!(
        "URLs at start: {} | at end: {}",
        format_number(report.start_count as u64),
        format_number(report.end_count as u64)
    );

    println!("\nPosition changes:");
    for row in &report.changes {
        let start = row
            .start_position
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        let end = row
            .end_position
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        println!(
            "- {} [{}] {} -> {}: {}",
            row.url, row.domain, start, end, row.change_text
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    let bytes = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let store = DatasetStore::new();
    let (dataset, ingest_report) = ingest::ingest_bytes(&bytes, args.workers)?;
    let dataset = store.publish(dataset);

    if !args.json {
        println!("\n--- SERP Position Analysis: {} ---", args.file.display());
        print_ingest(&ingest_report);
        println!();
    }

    if let (Some(keyword), Some(from), Some(to)) = (&args.keyword, args.from, args.to) {
        let comparison = stats::compare_over_time(&dataset, keyword, from, to)?;
        emit(args.json, &report::comparison_report(&comparison), print_comparison)
    } else if let Some(keyword) = &args.keyword {
        let result = stats::keyword_analytics(&dataset, keyword)?;
        emit(args.json, &report::keyword_report(&result), print_keyword)
    } else if let Some(domain) = &args.domain {
        let result = stats::domain_analytics(&dataset, domain)?;
        emit(args.json, &report::domain_report(&result), print_domain)
    } else {
        let summary = stats::overall_summary(&dataset);
        emit(args.json, &report::summary_report(&summary), print_summary)
    }
}
