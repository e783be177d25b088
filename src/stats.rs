use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::{Dataset, Record};
use crate::domain::normalize_domain;
use crate::error::QueryError;

/// Fixed, ordered, exhaustive position bands: every position ≥ 1 falls in
/// exactly one.
pub const POSITION_BANDS: &[PositionBand] = &[
    PositionBand { label: "1-3", lo: 1, hi: Some(3) },
    PositionBand { label: "4-10", lo: 4, hi: Some(10) },
    PositionBand { label: "11-20", lo: 11, hi: Some(20) },
    PositionBand { label: "21-50", lo: 21, hi: Some(50) },
    PositionBand { label: "51-100", lo: 51, hi: Some(100) },
    PositionBand { label: "100+", lo: 101, hi: None },
];

pub const TOP_DOMAINS_BY_POSITION: usize = 15;
pub const TOP_KEYWORDS_BY_VOLUME: usize = 20;
pub const TOP_DOMAINS_BY_FREQUENCY: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct PositionBand {
    pub label: &'static str,
    pub lo: u32,
    pub hi: Option<u32>,
}

impl PositionBand {
    fn contains(&self, position: u32) -> bool {
        position >= self.lo && self.hi.map_or(true, |hi| position <= hi)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandCount {
    pub label: &'static str,
    pub count: usize,
}

/// Per-key position statistics within a filtered subset. Mean stays an exact
/// float average here; rounding happens at projection time only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: String,
    pub mean: f64,
    pub min: u32,
    pub max: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRow {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_keywords: usize,
    pub total_domains: usize,
    pub total_urls: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub position_distribution: Vec<BandCount>,
    pub top_domains: Vec<AggregateRow>,
    pub keyword_volume: Vec<CountRow>,
    pub domain_frequency: Vec<CountRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordResult {
    pub keyword: String,
    pub observations: usize,
    pub position_distribution: Vec<BandCount>,
    pub domain_ranking: Vec<AggregateRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainResult {
    pub domain: String,
    pub observations: usize,
    pub keyword_ranking: Vec<AggregateRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Improved,
    Declined,
    Unchanged,
    New,
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlPosition {
    pub url: String,
    pub domain: String,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionChange {
    pub url: String,
    pub domain: String,
    pub start_position: Option<u32>,
    pub end_position: Option<u32>,
    pub change: Option<i64>,
    pub status: ChangeStatus,
}

/// Keyword positions compared between two dates. `start_date`/`end_date` are
/// the dates actually used after fallback, not necessarily the ones asked
/// for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub keyword: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub available_dates: Vec<NaiveDate>,
    pub start_urls: Vec<UrlPosition>,
    pub end_urls: Vec<UrlPosition>,
    pub changes: Vec<PositionChange>,
}

fn position_histogram<I>(positions: I) -> Vec<BandCount>
where
    I: IntoIterator<Item = u32>,
{
    let mut counts = vec![0usize; POSITION_BANDS.len()];
    for position in positions {
        if let Some(i) = POSITION_BANDS.iter().position(|band| band.contains(position)) {
            counts[i] += 1;
        }
    }
    POSITION_BANDS
        .iter()
        .zip(counts)
        .map(|(band, count)| BandCount { label: band.label, count })
        .collect()
}

struct PositionAgg {
    sum: u64,
    min: u32,
    max: u32,
    count: usize,
}

/// Group positions by key, ranked ascending by mean (best first), ties by
/// ascending key.
fn aggregate_by<'a, I, F>(records: I, key: F) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a Record>,
    F: Fn(&'a Record) -> &'a str,
{
    let mut groups: HashMap<&str, PositionAgg> = HashMap::new();
    for record in records {
        let agg = groups.entry(key(record)).or_insert(PositionAgg {
            sum: 0,
            min: u32::MAX,
            max: 0,
            count: 0,
        });
        agg.sum += u64::from(record.position);
        agg.min = agg.min.min(record.position);
        agg.max = agg.max.max(record.position);
        agg.count += 1;
    }

    let mut rows: Vec<AggregateRow> = groups
        .into_iter()
        .map(|(key, agg)| AggregateRow {
            key: key.to_string(),
            mean: agg.sum as f64 / agg.count as f64,
            min: agg.min,
            max: agg.max,
            count: agg.count,
        })
        .collect();
    rows.sort_by(|a, b| a.mean.total_cmp(&b.mean).then_with(|| a.key.cmp(&b.key)));
    rows
}

/// Group record counts by key, ranked descending by count, ties by ascending
/// key.
fn count_by<'a, I, F>(records: I, key: F) -> Vec<CountRow>
where
    I: IntoIterator<Item = &'a Record>,
    F: Fn(&'a Record) -> &'a str,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }

    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(key, count)| CountRow { key: key.to_string(), count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    rows
}

/// Sorted distinct keywords, as offered by a selection control.
pub fn list_keywords(dataset: &Dataset) -> &[String] {
    dataset.keywords()
}

pub fn overall_summary(dataset: &Dataset) -> Summary {
    let records = dataset.records();

    let mut top_domains = aggregate_by(records, |r| r.domain.as_str());
    top_domains.truncate(TOP_DOMAINS_BY_POSITION);

    let mut keyword_volume = count_by(records, |r| r.keyword.as_str());
    keyword_volume.truncate(TOP_KEYWORDS_BY_VOLUME);

    let mut domain_frequency = count_by(records, |r| r.domain.as_str());
    domain_frequency.truncate(TOP_DOMAINS_BY_FREQUENCY);

    Summary {
        total_keywords: dataset.keywords().len(),
        total_domains: dataset.domains().len(),
        total_urls: records.len(),
        date_range: dataset
            .observed_range()
            .map(|(lo, hi)| (lo.date(), hi.date())),
        position_distribution: position_histogram(records.iter().map(|r| r.position)),
        top_domains,
        keyword_volume,
        domain_frequency,
    }
}

pub fn keyword_analytics(dataset: &Dataset, keyword: &str) -> Result<KeywordResult, QueryError> {
    let subset: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|r| r.keyword == keyword)
        .collect();
    if subset.is_empty() {
        return Err(QueryError::KeywordNotFound(keyword.to_string()));
    }

    Ok(KeywordResult {
        keyword: keyword.to_string(),
        observations: subset.len(),
        position_distribution: position_histogram(subset.iter().map(|r| r.position)),
        domain_ranking: aggregate_by(subset.iter().copied(), |r| r.domain.as_str()),
    })
}

pub fn domain_analytics(dataset: &Dataset, domain: &str) -> Result<DomainResult, QueryError> {
    // Same normalization as ingestion, so WWW.Example.com matches example.com.
    let normalized = normalize_domain(domain);
    let subset: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|r| r.domain == normalized)
        .collect();
    if subset.is_empty() {
        return Err(QueryError::DomainNotFound(normalized));
    }

    Ok(DomainResult {
        domain: normalized,
        observations: subset.len(),
        keyword_ranking: aggregate_by(subset.iter().copied(), |r| r.keyword.as_str()),
    })
}

/// One keyword's observations on one date, deduplicated by URL (first
/// observation wins), sorted ascending by position.
fn snapshot(subset: &[&Record], date: NaiveDate) -> Vec<UrlPosition> {
    let mut seen = HashSet::new();
    let mut rows: Vec<UrlPosition> = subset
        .iter()
        .filter(|r| r.observed_at.map_or(false, |t| t.date() == date))
        .filter(|r| seen.insert(r.url.as_str()))
        .map(|r| UrlPosition {
            url: r.url.clone(),
            domain: r.domain.clone(),
            position: r.position,
        })
        .collect();
    rows.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.url.cmp(&b.url)));
    rows
}

fn status_rank(status: ChangeStatus) -> u8 {
    match status {
        ChangeStatus::Improved | ChangeStatus::Declined => 0,
        ChangeStatus::New | ChangeStatus::Dropped => 1,
        ChangeStatus::Unchanged => 2,
    }
}

pub fn compare_over_time(
    dataset: &Dataset,
    keyword: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Comparison, QueryError> {
    let subset: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|r| r.keyword == keyword)
        .collect();
    if subset.is_empty() {
        return Err(QueryError::KeywordNotFound(keyword.to_string()));
    }

    let mut available_dates: Vec<NaiveDate> = subset
        .iter()
        .filter_map(|r| r.observed_at.map(|t| t.date()))
        .collect();
    available_dates.sort();
    available_dates.dedup();

    // A requested date with no observations falls back to the earliest
    // (start) or latest (end) date seen for this keyword.
    let start_date = if available_dates.contains(&start_date) {
        start_date
    } else {
        available_dates.first().copied().unwrap_or(start_date)
    };
    let end_date = if available_dates.contains(&end_date) {
        end_date
    } else {
        available_dates.last().copied().unwrap_or(end_date)
    };

    let start_urls = snapshot(&subset, start_date);
    let end_urls = snapshot(&subset, end_date);

    let start_map: HashMap<&str, &UrlPosition> =
        start_urls.iter().map(|u| (u.url.as_str(), u)).collect();
    let end_map: HashMap<&str, &UrlPosition> =
        end_urls.iter().map(|u| (u.url.as_str(), u)).collect();

    let mut urls: Vec<&str> = start_map.keys().chain(end_map.keys()).copied().collect();
    urls.sort_unstable();
    urls.dedup();

    let mut changes = Vec::with_capacity(urls.len());
    for url in urls {
        let start = start_map.get(url).copied();
        let end = end_map.get(url).copied();
        let (change, status) = match (start, end) {
            (Some(s), Some(e)) => {
                let delta = i64::from(e.position) - i64::from(s.position);
                let status = if delta < 0 {
                    ChangeStatus::Improved
                } else if delta > 0 {
                    ChangeStatus::Declined
                } else {
                    ChangeStatus::Unchanged
                };
                (Some(delta), status)
            }
            (None, Some(_)) => (None, ChangeStatus::New),
            (Some(_), None) => (None, ChangeStatus::Dropped),
            (None, None) => continue,
        };
        let domain = start
            .or(end)
            .map(|u| u.domain.clone())
            .unwrap_or_default();
        changes.push(PositionChange {
            url: url.to_string(),
            domain,
            start_position: start.map(|u| u.position),
            end_position: end.map(|u| u.position),
            change,
            status,
        });
    }

    // Moved URLs first (largest absolute move leading), then new/dropped,
    // unchanged last.
    changes.sort_by(|a, b| {
        status_rank(a.status)
            .cmp(&status_rank(b.status))
            .then_with(|| {
                b.change
                    .map_or(0, i64::abs)
                    .cmp(&a.change.map_or(0, i64::abs))
            })
            .then_with(|| a.url.cmp(&b.url))
    });

    Ok(Comparison {
        keyword: keyword.to_string(),
        start_date,
        end_date,
        available_dates,
        start_urls,
        end_urls,
        changes,
    })
}
