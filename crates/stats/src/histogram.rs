//! Rating distribution in half-star buckets.
//!
//! Bucket `i` holds ratings that round to `i * 0.5`, so a 0–5 scale yields
//! eleven buckets. The bucket index is `round(rating * 2)` using
//! round-half-away-from-zero (`f64::round`): `0.25 -> 1`, `4.75 -> 10`.

use data_loader::UserRatingsSnapshot;
use tracing::warn;

/// Number of half-star buckets on the 0–5 scale
pub const BUCKET_COUNT: usize = 11;

const MAX_BUCKET: usize = BUCKET_COUNT - 1;

/// Count of ratings per half-star bucket
pub type RatingHistogram = [u32; BUCKET_COUNT];

/// Bucket index for a rating.
///
/// Ratings outside 0–5 clamp to the nearest end bucket and are logged;
/// `NaN` lands in bucket 0.
pub fn bucket_index(rating: f64) -> usize {
    if rating.is_nan() {
        warn!("Rating is NaN, counting it in bucket 0");
        return 0;
    }
    if !(0.0..=5.0).contains(&rating) {
        warn!("Rating {} outside 0-5, clamping to nearest bucket", rating);
    }

    let scaled = (rating * 2.0).round();
    if scaled <= 0.0 {
        0
    } else if scaled >= MAX_BUCKET as f64 {
        MAX_BUCKET
    } else {
        scaled as usize
    }
}

/// Rating value a bucket stands for (`0.0`, `0.5`, ... `5.0`)
pub fn bucket_label(index: usize) -> f64 {
    index as f64 * 0.5
}

/// Build the histogram for every entry of the snapshot
pub fn rating_histogram(snapshot: &UserRatingsSnapshot) -> RatingHistogram {
    let mut histogram = [0u32; BUCKET_COUNT];
    for (_, entry) in snapshot.iter() {
        histogram[bucket_index(entry.rating)] += 1;
    }
    histogram
}
