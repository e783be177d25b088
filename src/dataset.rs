use std::sync::{Arc, RwLock};

use chrono::NaiveDateTime;

use crate::error::QueryError;

/// One observed (keyword, URL, position) triple at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub keyword: String,
    pub url: String,
    pub domain: String,
    pub position: u32,
    pub observed_at: Option<NaiveDateTime>,
}

/// Immutable, ordered record collection from one ingestion. The derived
/// indices are computed once at construction from the records, never patched.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<Record>,
    keywords: Vec<String>,
    domains: Vec<String>,
    observed_range: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl Dataset {
    /// An empty record collection is a validation failure upstream, never a
    /// valid Dataset.
    pub fn from_records(records: Vec<Record>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let mut keywords: Vec<String> = records.iter().map(|r| r.keyword.clone()).collect();
        keywords.sort();
        keywords.dedup();

        let mut domains: Vec<String> = records.iter().map(|r| r.domain.clone()).collect();
        domains.sort();
        domains.dedup();

        let observed_range = records
            .iter()
            .filter_map(|r| r.observed_at)
            .fold(None, |range, t| match range {
                None => Some((t, t)),
                Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
            });

        Some(Self {
            records,
            keywords,
            domains,
            observed_range,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sorted distinct keywords, as shown in a selection control.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Sorted distinct normalized domains.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn observed_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.observed_range
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Single-slot holder of the current Dataset. Publish is one reference swap:
/// an in-flight reader holds the Arc it resolved and never sees a partial
/// replacement.
#[derive(Debug, Default)]
pub struct DatasetStore {
    slot: RwLock<Option<Arc<Dataset>>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly ingested Dataset, discarding the previous one in
    /// full. Returns the shared handle so the caller can query without a
    /// second store read.
    pub fn publish(&self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        let mut slot = self.slot.write().expect("dataset store lock poisoned");
        *slot = Some(Arc::clone(&dataset));
        dataset
    }

    pub fn current(&self) -> Result<Arc<Dataset>, QueryError> {
        self.slot
            .read()
            .expect("dataset store lock poisoned")
            .clone()
            .ok_or(QueryError::NoDatasetLoaded)
    }
}
