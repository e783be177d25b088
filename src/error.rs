use thiserror::Error;

/// Upload-level validation failures. Row-level problems are recovered by
/// dropping the row and only escalate here when the Dataset would be empty.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("upload contains no header row or data rows")]
    EmptyInput,

    #[error("missing required column '{field}' (accepted names: {aliases})")]
    MissingColumn {
        field: &'static str,
        aliases: String,
    },

    #[error("no valid rows after filtering ({dropped} of {read} rows dropped)")]
    NoValidRows { read: usize, dropped: usize },
}

/// Query-level outcomes. The NotFound variants are normal results for inputs
/// absent from the current Dataset, distinct from querying before any
/// ingestion succeeded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no dataset loaded")]
    NoDatasetLoaded,

    #[error("keyword not found: {0}")]
    KeywordNotFound(String),

    #[error("domain not found: {0}")]
    DomainNotFound(String),
}
