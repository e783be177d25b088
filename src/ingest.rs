use std::time::Instant;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::dataset::{Dataset, Record};
use crate::domain::extract_domain;
use crate::error::IngestError;
use crate::table::{self, RawTable};

// Ordered alias tables per logical field, matched case-insensitively against
// the header. First match wins.
const KEYWORD_ALIASES: &[&str] = &["keyword"];
const URL_ALIASES: &[&str] = &["results", "result url", "url"];
const POSITION_ALIASES: &[&str] = &["position"];
const TIME_ALIASES: &[&str] = &["time", "date/time"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Ingestion diagnostics surfaced to the caller; not part of the Dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
}

/// Fixed-shape intermediate between raw cells and a validated Record: every
/// required field explicit, optional values still unparsed.
#[derive(Debug)]
struct RawRow {
    line: usize,
    keyword: Option<String>,
    url: Option<String>,
    position: Option<String>,
    time: Option<String>,
}

struct ColumnMap {
    keyword: usize,
    url: usize,
    position: usize,
    time: usize,
}

fn resolve_column(
    header: &[String],
    field: &'static str,
    aliases: &'static [&'static str],
) -> Result<usize, IngestError> {
    for alias in aliases {
        if let Some(idx) = header
            .iter()
            .position(|cell| cell.trim().eq_ignore_ascii_case(alias))
        {
            return Ok(idx);
        }
    }
    Err(IngestError::MissingColumn {
        field,
        aliases: aliases.join(", "),
    })
}

fn resolve_columns(header: &[String]) -> Result<ColumnMap, IngestError> {
    Ok(ColumnMap {
        keyword: resolve_column(header, "keyword", KEYWORD_ALIASES)?,
        url: resolve_column(header, "url", URL_ALIASES)?,
        position: resolve_column(header, "position", POSITION_ALIASES)?,
        time: resolve_column(header, "time", TIME_ALIASES)?,
    })
}

fn cell(row: &[String], idx: usize) -> Option<String> {
    row.get(idx)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

fn parse_position(raw: &str) -> Option<u32> {
    if let Ok(position) = raw.parse::<u32>() {
        return (position >= 1).then_some(position);
    }
    // Spreadsheet exports render integer columns as floats ("3.0").
    match raw.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= 1.0 && f <= f64::from(u32::MAX) => Some(f as u32),
        _ => None,
    }
}

pub fn parse_observed_at(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Sequential pre-pass: spreadsheet exports with merged keyword cells leave
/// continuation rows blank, so a blank keyword inherits the nearest
/// preceding one.
fn collect_raw_rows(table: &RawTable, columns: &ColumnMap) -> Vec<RawRow> {
    let mut last_keyword: Option<String> = None;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let keyword = cell(row, columns.keyword).or_else(|| last_keyword.clone());
            if keyword.is_some() {
                last_keyword = keyword.clone();
            }
            RawRow {
                line: i + 2, // 1-based, after the header
                keyword,
                url: cell(row, columns.url),
                position: cell(row, columns.position),
                time: cell(row, columns.time),
            }
        })
        .collect()
}

fn validate_row(raw: &RawRow) -> Option<Record> {
    let keyword = raw.keyword.clone()?;
    let url = raw.url.clone()?;
    let position = raw.position.as_deref().and_then(parse_position);
    let Some(position) = position else {
        debug!(
            action = "drop",
            component = "ingest",
            line = raw.line,
            "Row dropped: missing or unparseable position"
        );
        return None;
    };

    Some(Record {
        domain: extract_domain(&url),
        observed_at: raw.time.as_deref().and_then(parse_observed_at),
        keyword,
        url,
        position,
    })
}

fn validate_rows(raw_rows: &[RawRow]) -> Vec<Record> {
    raw_rows.par_iter().filter_map(validate_row).collect()
}

/// Parse an uploaded export into a Dataset plus ingestion metrics. Row-level
/// failures drop the row; the upload fails as a whole only when no valid
/// rows remain.
pub fn ingest_bytes(
    bytes: &[u8],
    workers: Option<usize>,
) -> Result<(Dataset, IngestReport), IngestError> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "ingest",
        bytes = bytes.len(),
        "Starting upload ingestion"
    );

    let table = table::parse_table(bytes).ok_or(IngestError::EmptyInput)?;
    if table.rows.is_empty() {
        return Err(IngestError::EmptyInput);
    }
    let columns = resolve_columns(&table.header)?;

    let raw_rows = collect_raw_rows(&table, &columns);
    let rows_read = raw_rows.len();

    let workers = workers.unwrap_or_else(|| std::cmp::min(num_cpus::get(), 8));
    info!(
        action = "configure",
        component = "ingest",
        worker_count = workers,
        "Using workers for row validation"
    );

    let records = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| validate_rows(&raw_rows)),
        Err(_) => validate_rows(&raw_rows),
    };

    let rows_kept = records.len();
    let rows_dropped = rows_read - rows_kept;
    let report = IngestReport {
        rows_read,
        rows_kept,
        rows_dropped,
    };

    let dataset = Dataset::from_records(records).ok_or(IngestError::NoValidRows {
        read: rows_read,
        dropped: rows_dropped,
    })?;

    info!(
        action = "complete",
        component = "ingest",
        rows_read,
        rows_kept,
        rows_dropped,
        keywords = dataset.keywords().len(),
        domains = dataset.domains().len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Ingestion completed"
    );

    Ok((dataset, report))
}
