pub mod args;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod report;
pub mod stats;
pub mod table;
pub mod utils;

pub use args::Args;
pub use dataset::{Dataset, DatasetStore, Record};
pub use error::{IngestError, QueryError};
pub use ingest::{ingest_bytes, IngestReport};
pub use stats::{
    compare_over_time, domain_analytics, keyword_analytics, list_keywords, overall_summary,
    AggregateRow, Comparison, DomainResult, KeywordResult, Summary,
};
