//! Rating statistics for a single user.
//!
//! This crate turns a [`UserRatingsSnapshot`] and the movie [`Catalog`] into
//! the three views of the statistics screen:
//! - a half-star rating histogram
//! - average rating per genre
//! - movies watched per month of a selected year
//!
//! Every function here is pure: the same snapshot, catalog and year always
//! produce the same summary, and nothing is carried over between calls.
//!
//! ## Example Usage
//! ```ignore
//! use stats::aggregate;
//!
//! let summary = aggregate(&ratings.snapshot, &catalog, 2024);
//! println!("{} ratings", summary.total_ratings());
//! for genre in &summary.genre_averages {
//!     println!("{}: {}", genre.genre, genre.display_average());
//! }
//! ```

pub mod genres;
pub mod histogram;
pub mod monthly;

pub use genres::{GenreStat, genre_averages};
pub use histogram::{BUCKET_COUNT, RatingHistogram, bucket_index, bucket_label, rating_histogram};
pub use monthly::{MONTH_LABELS, MonthlyCounts, monthly_watch_counts, parse_rated_at};

use data_loader::{Catalog, UserRatingsSnapshot};
use serde::Serialize;
use tracing::{debug, instrument};

/// All three statistics views for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub histogram: RatingHistogram,
    pub genre_averages: Vec<GenreStat>,
    pub year: i32,
    pub monthly_watch_counts: MonthlyCounts,
}

impl RatingSummary {
    /// Number of ratings the histogram was built from
    pub fn total_ratings(&self) -> u32 {
        self.histogram.iter().sum()
    }

    /// Ratings counted in the selected year
    pub fn watched_in_year(&self) -> u32 {
        self.monthly_watch_counts.iter().sum()
    }

    /// Recompute only the monthly series for another year
    pub fn with_year(mut self, snapshot: &UserRatingsSnapshot, year: i32) -> Self {
        self.year = year;
        self.monthly_watch_counts = monthly_watch_counts(snapshot, year);
        self
    }
}

/// Compute the full statistics summary from scratch
#[instrument(skip_all, fields(ratings = snapshot.len(), year = selected_year))]
pub fn aggregate(
    snapshot: &UserRatingsSnapshot,
    catalog: &Catalog,
    selected_year: i32,
) -> RatingSummary {
    let summary = RatingSummary {
        histogram: rating_histogram(snapshot),
        genre_averages: genre_averages(snapshot, catalog),
        year: selected_year,
        monthly_watch_counts: monthly_watch_counts(snapshot, selected_year),
    };
    debug!(
        "Aggregated {} ratings into {} genres, {} watched in {}",
        summary.total_ratings(),
        summary.genre_averages.len(),
        summary.watched_in_year(),
        selected_year
    );
    summary
}
