//! Integration tests for the statistics aggregation.
//!
//! These build a small catalog and ratings document the way the client
//! receives them and check the three views together.

use data_loader::{Catalog, MovieRecord, parser};
use stats::{BUCKET_COUNT, aggregate};

fn create_test_catalog() -> Catalog {
    Catalog::from_records(vec![
        MovieRecord::new(1, "Heat", vec!["Action".into(), "Drama".into()]),
        MovieRecord::new(2, "The Godfather", vec!["Drama".into()]),
        MovieRecord::new(3, "Paddington", vec!["Family".into(), "Comedy".into()]),
        MovieRecord::new(4, "Alien", vec!["Horror".into(), "Science Fiction".into()]),
    ])
    .unwrap()
}

const RATINGS_DOC: &str = r#"{
    "1": {"rating": 5.0, "rated_at": "2024-01-15T20:14:03.512Z"},
    "2": {"rating": 3.0, "rated_at": "2024-01-20"},
    "3": {"rating": 4.75, "rated_at": "2023-05-01"},
    "4": 0.25,
    "77777": {"rating": 2.0, "rated_at": "2024-11-30"},
    "bogus": 3.0
}"#;

#[test]
fn test_summary_from_ratings_document() {
    let catalog = create_test_catalog();
    let parsed = parser::parse_user_ratings(RATINGS_DOC).unwrap();
    assert_eq!(parsed.dropped.len(), 1);

    let summary = aggregate(&parsed.snapshot, &catalog, 2024);

    // every decoded entry lands in exactly one bucket, including the
    // rating for a movie missing from the catalog
    assert_eq!(summary.histogram.len(), BUCKET_COUNT);
    assert_eq!(summary.total_ratings() as usize, parsed.snapshot.len());
    assert_eq!(summary.histogram[10], 2); // 5.0 and 4.75
    assert_eq!(summary.histogram[6], 1); // 3.0
    assert_eq!(summary.histogram[4], 1); // 2.0
    assert_eq!(summary.histogram[1], 1); // 0.25

    let genres: Vec<(&str, f64)> = summary
        .genre_averages
        .iter()
        .map(|g| (g.genre.as_str(), g.average()))
        .collect();
    assert_eq!(
        genres,
        vec![
            ("Action", 5.0),
            ("Drama", 4.0),
            ("Family", 4.75),
            ("Comedy", 4.75),
            ("Horror", 0.25),
            ("Science Fiction", 0.25),
        ]
    );

    assert_eq!(summary.monthly_watch_counts[0], 2);
    assert_eq!(summary.monthly_watch_counts[10], 1);
    assert_eq!(summary.watched_in_year(), 3);
}

#[test]
fn test_aggregate_is_idempotent() {
    let catalog = create_test_catalog();
    let parsed = parser::parse_user_ratings(RATINGS_DOC).unwrap();

    let first = aggregate(&parsed.snapshot, &catalog, 2024);
    let second = aggregate(&parsed.snapshot, &catalog, 2024);
    assert_eq!(first, second);
}

#[test]
fn test_entry_order_does_not_matter() {
    let catalog = create_test_catalog();
    let forward = parser::parse_user_ratings(r#"{"1": 5.0, "2": 3.0}"#).unwrap();
    let backward = parser::parse_user_ratings(r#"{"2": 3.0, "1": 5.0}"#).unwrap();

    assert_eq!(
        aggregate(&forward.snapshot, &catalog, 2024),
        aggregate(&backward.snapshot, &catalog, 2024)
    );
}

#[test]
fn test_year_without_entries() {
    let catalog = create_test_catalog();
    let parsed = parser::parse_user_ratings(RATINGS_DOC).unwrap();

    let summary = aggregate(&parsed.snapshot, &catalog, 1987);
    assert_eq!(summary.monthly_watch_counts, [0; 12]);
    assert_eq!(summary.total_ratings(), 5);
}
