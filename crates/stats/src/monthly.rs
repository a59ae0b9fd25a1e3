//! Movies watched per month of a selected year, keyed on `rated_at`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use data_loader::UserRatingsSnapshot;
use tracing::debug;

/// Short month names, index 0 = January
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Ratings counted per month, index 0 = January
pub type MonthlyCounts = [u32; 12];

/// Year and month (1-12) of a `rated_at` timestamp.
///
/// Accepts RFC 3339 (converted to UTC), a naive ISO datetime, or a plain
/// `YYYY-MM-DD` date. Returns `None` for anything else.
pub fn parse_rated_at(text: &str) -> Option<(i32, u32)> {
    let text = text.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        let utc = instant.with_timezone(&Utc);
        return Some((utc.year(), utc.month()));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some((naive.year(), naive.month()));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| (date.year(), date.month()))
}

/// Count ratings made in each month of `year`.
///
/// Entries without a timestamp, with an unparseable one, or from another year
/// are not counted.
pub fn monthly_watch_counts(snapshot: &UserRatingsSnapshot, year: i32) -> MonthlyCounts {
    let mut counts = [0u32; 12];

    for (movie_id, entry) in snapshot.iter() {
        let Some(rated_at) = entry.rated_at.as_deref() else {
            continue;
        };
        match parse_rated_at(rated_at) {
            Some((entry_year, month)) if entry_year == year => {
                counts[(month - 1) as usize] += 1;
            }
            Some(_) => {}
            None => debug!("Unparseable rated_at {:?} for movie {}", rated_at, movie_id),
        }
    }

    counts
}
