// Keyword position comparison between two observation dates.

use chrono::NaiveDate;
use serptrack::stats::ChangeStatus;
use serptrack::{compare_over_time, ingest_bytes, Dataset, QueryError};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn fixture() -> Dataset {
    let text = "Keyword,Results,Position,Time\n\
                shoes,https://a.com/x,8,2025-03-01 09:00:00\n\
                shoes,https://b.com/y,2,2025-03-01 09:05:00\n\
                shoes,https://c.com/z,5,2025-03-01 09:10:00\n\
                shoes,https://a.com/x,3,2025-03-08 09:00:00\n\
                shoes,https://b.com/y,2,2025-03-08 09:05:00\n\
                shoes,https://d.com/w,9,2025-03-08 09:10:00\n";
    let (dataset, _) = ingest_bytes(text.as_bytes(), Some(1)).unwrap();
    dataset
}

#[test]
fn classifies_every_url_change() {
    let comparison = compare_over_time(&fixture(), "shoes", date(1), date(8)).unwrap();

    assert_eq!(comparison.start_urls.len(), 3);
    assert_eq!(comparison.end_urls.len(), 3);

    let by_url = |url: &str| {
        comparison
            .changes
            .iter()
            .find(|c| c.url == url)
            .unwrap()
            .clone()
    };

    let improved = by_url("https://a.com/x");
    assert_eq!(improved.status, ChangeStatus::Improved);
    assert_eq!(improved.change, Some(-5));

    let unchanged = by_url("https://b.com/y");
    assert_eq!(unchanged.status, ChangeStatus::Unchanged);
    assert_eq!(unchanged.change, Some(0));

    assert_eq!(by_url("https://c.com/z").status, ChangeStatus::Dropped);
    assert_eq!(by_url("https://d.com/w").status, ChangeStatus::New);
}

#[test]
fn moved_urls_lead_the_change_list() {
    let comparison = compare_over_time(&fixture(), "shoes", date(1), date(8)).unwrap();

    let statuses: Vec<ChangeStatus> = comparison.changes.iter().map(|c| c.status).collect();
    assert_eq!(statuses[0], ChangeStatus::Improved);
    assert_eq!(*statuses.last().unwrap(), ChangeStatus::Unchanged);
}

#[test]
fn snapshots_sort_ascending_by_position() {
    let comparison = compare_over_time(&fixture(), "shoes", date(1), date(8)).unwrap();
    let positions: Vec<u32> = comparison.start_urls.iter().map(|u| u.position).collect();
    assert_eq!(positions, [2, 5, 8]);
}

#[test]
fn duplicate_urls_within_a_date_keep_first_observation() {
    let text = "Keyword,Results,Position,Time\n\
                shoes,https://a.com/x,4,2025-03-01 09:00:00\n\
                shoes,https://a.com/x,6,2025-03-01 15:00:00\n\
                shoes,https://a.com/x,3,2025-03-08 09:00:00\n";
    let (dataset, _) = ingest_bytes(text.as_bytes(), Some(1)).unwrap();

    let comparison = compare_over_time(&dataset, "shoes", date(1), date(8)).unwrap();
    assert_eq!(comparison.start_urls.len(), 1);
    assert_eq!(comparison.start_urls[0].position, 4);
    assert_eq!(comparison.changes[0].change, Some(-1));
}

#[test]
fn unmatched_dates_fall_back_to_earliest_and_latest() {
    let comparison = compare_over_time(&fixture(), "shoes", date(2), date(20)).unwrap();
    assert_eq!(comparison.start_date, date(1));
    assert_eq!(comparison.end_date, date(8));
    assert_eq!(comparison.available_dates, [date(1), date(8)]);
}

#[test]
fn unknown_keyword_is_not_found() {
    let err = compare_over_time(&fixture(), "sneakers", date(1), date(8)).unwrap_err();
    assert_eq!(err, QueryError::KeywordNotFound("sneakers".to_string()));
}
