// End-to-end upload paths: bytes in, Dataset + metrics out, store semantics.

use serptrack::{ingest_bytes, overall_summary, Dataset, DatasetStore, IngestError, QueryError};

fn ingest(text: &str) -> Dataset {
    let (dataset, _) = ingest_bytes(text.as_bytes(), Some(1)).unwrap();
    dataset
}

#[test]
fn two_row_scenario_aggregates_per_domain() {
    let dataset = ingest(
        "Keyword,Results,Position,Time\n\
         shoes,https://www.A.com/x,3,2025-03-01 10:00:00\n\
         shoes,http://b.com/y,11,2025-03-02 10:00:00\n",
    );

    let summary = overall_summary(&dataset);
    assert_eq!(summary.total_keywords, 1);
    assert_eq!(summary.total_domains, 2);
    assert_eq!(summary.total_urls, 2);

    let result = serptrack::keyword_analytics(&dataset, "shoes").unwrap();
    let ranking = &result.domain_ranking;
    assert_eq!(ranking.len(), 2);

    assert_eq!(ranking[0].key, "a.com");
    assert_eq!(ranking[0].mean, 3.0);
    assert_eq!((ranking[0].min, ranking[0].max, ranking[0].count), (3, 3, 1));

    assert_eq!(ranking[1].key, "b.com");
    assert_eq!(ranking[1].mean, 11.0);
    assert_eq!((ranking[1].min, ranking[1].max, ranking[1].count), (11, 11, 1));
}

#[test]
fn failed_ingestion_leaves_previous_dataset_untouched() {
    let store = DatasetStore::new();
    store.publish(ingest(
        "Keyword,Results,Position,Time\nshoes,https://a.com/x,3,2025-03-01\n",
    ));

    // Position column missing: rejected before anything reaches the store.
    let err = ingest_bytes(
        b"Keyword,Results,Time\nboots,https://b.com/y,2025-03-02\n",
        Some(1),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn { field: "position", .. }));

    let current = store.current().unwrap();
    assert_eq!(current.keywords(), ["shoes"]);
}

#[test]
fn store_reports_missing_dataset_distinctly() {
    let store = DatasetStore::new();
    assert_eq!(store.current().unwrap_err(), QueryError::NoDatasetLoaded);
}

#[test]
fn reingesting_the_same_input_is_deterministic() {
    let text = "Keyword,Results,Position,Time\n\
                shoes,https://www.a.com/x,3,2025-03-01\n\
                boots,https://b.com/y,7,2025-03-02\n\
                shoes,https://c.com/z,12,2025-03-03\n";

    let first = overall_summary(&ingest(text));
    let second = overall_summary(&ingest(text));
    assert_eq!(first, second);
}

#[test]
fn sole_unparseable_row_fails_the_upload() {
    let err = ingest_bytes(
        b"Keyword,Results,Position,Time\nshoes,https://a.com/x,N/A,2025-03-01\n",
        Some(1),
    )
    .unwrap_err();
    assert_eq!(err, IngestError::NoValidRows { read: 1, dropped: 1 });
}

#[test]
fn quoted_cells_survive_the_pipeline() {
    let dataset = ingest(
        "Keyword,Results,Position,Time\n\
         \"running shoes, cheap\",https://a.com/x,3,2025-03-01\n",
    );
    assert_eq!(dataset.records()[0].keyword, "running shoes, cheap");
}

#[test]
fn metrics_count_read_kept_and_dropped() {
    let (_, report) = ingest_bytes(
        b"Keyword,Results,Position,Time\n\
          shoes,https://a.com/x,3,2025-03-01\n\
          shoes,https://b.com/y,bad,2025-03-01\n\
          shoes,https://c.com/z,5,2025-03-01\n",
        Some(1),
    )
    .unwrap();
    assert_eq!(report.rows_read, 3);
    assert_eq!(report.rows_kept, 2);
    assert_eq!(report.rows_dropped, 1);
}
