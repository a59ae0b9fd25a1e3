//! Core domain types for the movie catalog and a user's ratings.
//!
//! The catalog is static and loaded once; a ratings snapshot is an immutable
//! point-in-time copy of one user's rating document.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie (TMDB id in the bundled catalog)
pub type MovieId = u32;

// =============================================================================
// Movie-related Types
// =============================================================================

/// One entry of the bundled movie catalog.
///
/// Only `id`, `title`, `genres` and `poster_path` are used by the statistics
/// and feed code; the remaining fields are carried for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    /// Ordered genre labels, possibly empty.
    ///
    /// Accepts either a JSON array or a single comma-separated string.
    #[serde(default, deserialize_with = "crate::parser::genre_labels")]
    pub genres: Vec<String>,
    /// Relative poster path; an empty string in the dataset means "none"
    #[serde(default, deserialize_with = "crate::parser::non_empty_text")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "crate::parser::non_empty_text")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
}

impl MovieRecord {
    /// Minimal record with no descriptive fields
    pub fn new(id: MovieId, title: impl Into<String>, genres: Vec<String>) -> Self {
        Self {
            id,
            title: title.into(),
            genres,
            poster_path: None,
            release_date: None,
            overview: String::new(),
            popularity: 0.0,
            vote_average: 0.0,
            vote_count: 0,
        }
    }
}

// =============================================================================
// Rating Types
// =============================================================================

/// A user's rating of one movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    /// Rating value, 0.0 to 5.0 in half-point steps when entered through the UI
    pub rating: f64,
    /// When the rating was made; absent for legacy entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_at: Option<String>,
}

impl RatingEntry {
    pub fn new(rating: f64) -> Self {
        Self {
            rating,
            rated_at: None,
        }
    }

    pub fn rated_at(rating: f64, rated_at: impl Into<String>) -> Self {
        Self {
            rating,
            rated_at: Some(rated_at.into()),
        }
    }
}

/// Point-in-time copy of all of a user's ratings, keyed by movie id.
///
/// Backed by a `BTreeMap` so iteration is always in ascending movie id
/// order, independent of the order the store returned the entries in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRatingsSnapshot {
    entries: BTreeMap<MovieId, RatingEntry>,
}

impl UserRatingsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the rating for a movie, returning the previous one
    pub fn rate(
        &mut self,
        movie_id: MovieId,
        rating: f64,
        rated_at: Option<String>,
    ) -> Option<RatingEntry> {
        self.entries
            .insert(movie_id, RatingEntry { rating, rated_at })
    }

    pub fn insert(&mut self, movie_id: MovieId, entry: RatingEntry) -> Option<RatingEntry> {
        self.entries.insert(movie_id, entry)
    }

    pub fn get(&self, movie_id: MovieId) -> Option<&RatingEntry> {
        self.entries.get(&movie_id)
    }

    /// Whether the user already rated this movie
    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.entries.contains_key(&movie_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in ascending movie id order
    pub fn iter(&self) -> impl Iterator<Item = (MovieId, &RatingEntry)> {
        self.entries.iter().map(|(&id, entry)| (id, entry))
    }

    /// Bare `{movieId: rating}` map, the shape the recommendation service expects
    pub fn rating_values(&self) -> BTreeMap<MovieId, f64> {
        self.entries
            .iter()
            .map(|(&id, entry)| (id, entry.rating))
            .collect()
    }
}

impl FromIterator<(MovieId, RatingEntry)> for UserRatingsSnapshot {
    fn from_iter<I: IntoIterator<Item = (MovieId, RatingEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Catalog - the static movie index
// =============================================================================

/// The bundled movie catalog with an id index.
///
/// Records keep their dataset order (search results and listings follow it);
/// `by_id` maps each id to its position for O(1) lookups.
#[derive(Debug, Default)]
pub struct Catalog {
    pub(crate) movies: Vec<MovieRecord>,
    pub(crate) by_id: HashMap<MovieId, usize>,
}

impl Catalog {
    /// Creates a new, empty Catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a movie by ID
    pub fn get(&self, id: MovieId) -> Option<&MovieRecord> {
        self.by_id.get(&id).map(|&pos| &self.movies[pos])
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All records in dataset order
    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
