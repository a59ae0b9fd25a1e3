//! Catalog building and query logic.
//!
//! - build the id index over the dataset records
//! - validate that ids are unique
//! - title search and poster URL resolution
//! - join a user's ratings with catalog records

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Minimum query length before title search returns anything
pub const MIN_SEARCH_QUERY_LEN: usize = 3;

/// Base URL for poster images referenced by `poster_path`
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w200";

impl Catalog {
    /// Load the bundled catalog dataset from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading movie catalog from {:?}", path);
        let records = parser::parse_catalog_file(path)?;
        let catalog = Self::from_records(records)?;
        info!("Catalog loaded with {} movies", catalog.len());
        Ok(catalog)
    }

    /// Build a catalog from already-decoded records, keeping their order.
    ///
    /// Fails on duplicate ids since the id is the catalog's key.
    pub fn from_records(records: Vec<MovieRecord>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        for (pos, movie) in records.iter().enumerate() {
            if by_id.insert(movie.id, pos).is_some() {
                return Err(DataLoadError::DuplicateMovie { id: movie.id });
            }
        }
        Ok(Self {
            movies: records,
            by_id,
        })
    }

    /// Case-insensitive substring search over titles, in catalog order.
    ///
    /// Queries shorter than [`MIN_SEARCH_QUERY_LEN`] characters match nothing.
    pub fn search_titles(&self, query: &str) -> Vec<&MovieRecord> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        let matches: Vec<&MovieRecord> = self
            .movies
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .collect();
        debug!("Title search {:?} matched {} movies", query, matches.len());
        matches
    }

    /// Full poster URL for a movie, if the movie is known and has a poster
    pub fn poster_url(&self, id: MovieId) -> Option<String> {
        let path = self.get(id)?.poster_path.as_deref()?;
        if path.starts_with("http://") || path.starts_with("https://") {
            Some(path.to_string())
        } else {
            Some(format!("{}{}", POSTER_BASE_URL, path))
        }
    }

    /// The user's rated movies joined with their catalog records.
    ///
    /// Ratings for movies missing from the catalog are skipped.
    pub fn rated_movies<'a>(
        &'a self,
        snapshot: &'a UserRatingsSnapshot,
    ) -> Vec<(&'a MovieRecord, &'a RatingEntry)> {
        snapshot
            .iter()
            .filter_map(|(id, entry)| self.get(id).map(|movie| (movie, entry)))
            .collect()
    }
}
