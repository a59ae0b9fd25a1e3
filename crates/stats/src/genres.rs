//! Average rating per genre.

use data_loader::{Catalog, UserRatingsSnapshot};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Running rating total for one genre label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreStat {
    pub genre: String,
    pub sum: f64,
    pub count: u32,
}

impl GenreStat {
    fn new(genre: &str) -> Self {
        Self {
            genre: genre.to_string(),
            sum: 0.0,
            count: 0,
        }
    }

    /// Mean rating, unrounded
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Mean rating with two decimals, for display
    pub fn display_average(&self) -> String {
        format!("{:.2}", self.average())
    }
}

/// Accumulate ratings per genre for every rated movie found in the catalog.
///
/// Genres appear in the order they are first seen while walking the snapshot
/// in movie id order. Labels are compared exactly. Ratings whose movie is not
/// in the catalog are skipped here.
pub fn genre_averages(snapshot: &UserRatingsSnapshot, catalog: &Catalog) -> Vec<GenreStat> {
    let mut stats: Vec<GenreStat> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for (movie_id, entry) in snapshot.iter() {
        let Some(movie) = catalog.get(movie_id) else {
            debug!("Movie {} not in catalog, skipping for genre stats", movie_id);
            continue;
        };

        for genre in &movie.genres {
            let pos = *positions.entry(genre.as_str()).or_insert_with(|| {
                stats.push(GenreStat::new(genre));
                stats.len() - 1
            });
            stats[pos].sum += entry.rating;
            stats[pos].count += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieRecord;

    fn create_test_catalog() -> Catalog {
        Catalog::from_records(vec![
            MovieRecord::new(1, "Action Drama", vec!["Action".into(), "Drama".into()]),
            MovieRecord::new(2, "Just Drama", vec!["Drama".into()]),
            MovieRecord::new(3, "No Genres", vec![]),
            MovieRecord::new(4, "Lowercase", vec!["drama".into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_genre_averages() {
        let catalog = create_test_catalog();
        let mut snapshot = UserRatingsSnapshot::new();
        snapshot.rate(1, 5.0, None);
        snapshot.rate(2, 3.0, None);

        let stats = genre_averages(&snapshot, &catalog);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].genre, "Action");
        assert_eq!(stats[0].average(), 5.0);
        assert_eq!(stats[1].genre, "Drama");
        assert_eq!(stats[1].count, 2);
        assert_eq!(stats[1].average(), 4.0);
    }

    #[test]
    fn test_missing_movies_and_empty_genres() {
        let catalog = create_test_catalog();
        let mut snapshot = UserRatingsSnapshot::new();
        snapshot.rate(3, 4.0, None);
        snapshot.rate(999, 1.0, None);

        assert!(genre_averages(&snapshot, &catalog).is_empty());
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let catalog = create_test_catalog();
        let mut snapshot = UserRatingsSnapshot::new();
        snapshot.rate(2, 2.0, None);
        snapshot.rate(4, 4.0, None);

        let stats = genre_averages(&snapshot, &catalog);
        let names: Vec<&str> = stats.iter().map(|s| s.genre.as_str()).collect();
        assert_eq!(names, vec!["Drama", "drama"]);
    }

    #[test]
    fn test_display_average() {
        let stat = GenreStat {
            genre: "Comedy".into(),
            sum: 10.0,
            count: 3,
        };
        assert_eq!(stat.display_average(), "3.33");
        // stored value is never rounded
        assert!((stat.average() - 10.0 / 3.0).abs() < f64::EPSILON);
    }
}
