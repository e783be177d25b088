use serde::Serialize;

use crate::stats::{
    AggregateRow, BandCount, ChangeStatus, Comparison, CountRow, DomainResult, KeywordResult,
    PositionChange, Summary,
};

/// A named `(label, value)` series; the only shape the charting side ever
/// sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// One table row per AggregateRow; mean rounded to 2 decimals for display
/// only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub key: String,
    pub mean: f64,
    pub min: u32,
    pub max: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub total_keywords: usize,
    pub total_domains: usize,
    pub total_urls: usize,
    pub date_range: (String, String),
    pub charts: Vec<ChartSeries>,
    pub top_domains: Vec<RankingRow>,
    pub keyword_volume: Vec<CountRow>,
    pub domain_frequency: Vec<CountRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordReport {
    pub keyword: String,
    pub observations: usize,
    pub charts: Vec<ChartSeries>,
    pub domain_ranking: Vec<RankingRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainReport {
    pub domain: String,
    pub observations: usize,
    pub charts: Vec<ChartSeries>,
    pub keyword_ranking: Vec<RankingRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRow {
    pub url: String,
    pub domain: String,
    pub start_position: Option<u32>,
    pub end_position: Option<u32>,
    pub change_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub keyword: String,
    pub start_date: String,
    pub end_date: String,
    pub start_count: usize,
    pub end_count: usize,
    pub changes: Vec<ChangeRow>,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn band_series(name: &str, bands: &[BandCount]) -> ChartSeries {
    ChartSeries {
        name: name.to_string(),
        points: bands
            .iter()
            .map(|band| SeriesPoint {
                label: band.label.to_string(),
                value: band.count as f64,
            })
            .collect(),
    }
}

fn ranking_series(name: &str, rows: &[AggregateRow]) -> ChartSeries {
    ChartSeries {
        name: name.to_string(),
        points: rows
            .iter()
            .map(|row| SeriesPoint {
                label: row.key.clone(),
                value: round2(row.mean),
            })
            .collect(),
    }
}

fn count_series(name: &str, rows: &[CountRow]) -> ChartSeries {
    ChartSeries {
        name: name.to_string(),
        points: rows
            .iter()
            .map(|row| SeriesPoint {
                label: row.key.clone(),
                value: row.count as f64,
            })
            .collect(),
    }
}

fn ranking_rows(rows: &[AggregateRow]) -> Vec<RankingRow> {
    rows.iter()
        .map(|row| RankingRow {
            key: row.key.clone(),
            mean: round2(row.mean),
            min: row.min,
            max: row.max,
            count: row.count,
        })
        .collect()
}

fn format_date_range(range: Option<(chrono::NaiveDate, chrono::NaiveDate)>) -> (String, String) {
    match range {
        Some((lo, hi)) => (
            lo.format("%Y-%m-%d").to_string(),
            hi.format("%Y-%m-%d").to_string(),
        ),
        None => ("N/A".to_string(), "N/A".to_string()),
    }
}

fn change_text(change: &PositionChange) -> String {
    match change.status {
        ChangeStatus::Improved => {
            format!("↑ {} (improved)", change.change.unwrap_or(0).abs())
        }
        ChangeStatus::Declined => {
            format!("↓ {} (declined)", change.change.unwrap_or(0).abs())
        }
        ChangeStatus::Unchanged => "No change".to_string(),
        ChangeStatus::New => "New".to_string(),
        ChangeStatus::Dropped => "Dropped".to_string(),
    }
}

pub fn summary_report(summary: &Summary) -> SummaryReport {
    SummaryReport {
        total_keywords: summary.total_keywords,
        total_domains: summary.total_domains,
        total_urls: summary.total_urls,
        date_range: format_date_range(summary.date_range),
        charts: vec![
            band_series("position_distribution", &summary.position_distribution),
            ranking_series("top_domains_by_avg_position", &summary.top_domains),
            count_series("keyword_volume", &summary.keyword_volume),
            count_series("domain_frequency", &summary.domain_frequency),
        ],
        top_domains: ranking_rows(&summary.top_domains),
        keyword_volume: summary.keyword_volume.clone(),
        domain_frequency: summary.domain_frequency.clone(),
    }
}

pub fn keyword_report(result: &KeywordResult) -> KeywordReport {
    KeywordReport {
        keyword: result.keyword.clone(),
        observations: result.observations,
        charts: vec![
            band_series("position_distribution", &result.position_distribution),
            ranking_series("domain_performance", &result.domain_ranking),
        ],
        domain_ranking: ranking_rows(&result.domain_ranking),
    }
}

pub fn domain_report(result: &DomainResult) -> DomainReport {
    DomainReport {
        domain: result.domain.clone(),
        observations: result.observations,
        charts: vec![ranking_series("keyword_performance", &result.keyword_ranking)],
        keyword_ranking: ranking_rows(&result.keyword_ranking),
    }
}

pub fn comparison_report(comparison: &Comparison) -> ComparisonReport {
    ComparisonReport {
        keyword: comparison.keyword.clone(),
        start_date: comparison.start_date.format("%Y-%m-%d").to_string(),
        end_date: comparison.end_date.format("%Y-%m-%d").to_string(),
        start_count: comparison.start_urls.len(),
        end_count: comparison.end_urls.len(),
        changes: comparison
            .changes
            .iter()
            .map(|change| ChangeRow {
                url: change.url.clone(),
                domain: change.domain.clone(),
                start_position: change.start_position,
                end_position: change.end_position,
                change_text: change_text(change),
            })
            .collect(),
    }
}
