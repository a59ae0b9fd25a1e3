//! # Data Loader Crate
//!
//! Loads the bundled movie catalog and decodes a user's ratings document
//! into an immutable [`UserRatingsSnapshot`].
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MovieRecord, RatingEntry, UserRatingsSnapshot, Catalog)
//! - **parser**: Decode the catalog JSON and the ratings document
//! - **index**: Build the catalog id index, title search, poster URLs
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{parser, Catalog};
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_file(Path::new("data/popular_movies.json"))?;
//! let ratings = parser::parse_user_ratings_file(Path::new("data/ratings.json"))?;
//!
//! for (movie, entry) in catalog.rated_movies(&ratings.snapshot) {
//!     println!("{} rated {}", movie.title, entry.rating);
//! }
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{DataLoadError, Result};
pub use index::{MIN_SEARCH_QUERY_LEN, POSTER_BASE_URL};
pub use parser::{DropReason, DroppedRating, ParsedRatings};
pub use types::{
    // Type aliases
    MovieId,
    // Core types
    Catalog,
    MovieRecord,
    RatingEntry,
    UserRatingsSnapshot,
};
