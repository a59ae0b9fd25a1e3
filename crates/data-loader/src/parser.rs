//! Decoders for the catalog dataset and the per-user ratings document.
//!
//! - catalog: a JSON array of movie objects (`popular_movies.json`)
//! - ratings: the user's `movies` node from the key-value store, where each
//!   value is either a bare number (legacy format) or an object
//!   `{ "rating": 4.5, "rated_at": "2024-01-15T10:00:00.000Z" }`
//!
//! Catalog decoding is strict: a malformed catalog fails the load. Ratings
//! decoding is lenient per entry: an entry that cannot be understood is
//! dropped, logged and reported in [`ParsedRatings::dropped`].

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Read a whole file, mapping a missing file to [`DataLoadError::FileNotFound`]
fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

// =============================================================================
// Catalog
// =============================================================================

/// Parse the catalog dataset from a JSON string
pub fn parse_catalog(json: &str) -> Result<Vec<MovieRecord>> {
    serde_json::from_str(json).map_err(|source| DataLoadError::Json {
        document: "catalog",
        source,
    })
}

/// Parse the catalog dataset from a file
pub fn parse_catalog_file(path: &Path) -> Result<Vec<MovieRecord>> {
    parse_catalog(&read_document(path)?)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenreField {
    Labels(Vec<String>),
    Joined(String),
}

/// Deserialize genres given either as `["Action", "Drama"]` or `"Action, Drama"`.
///
/// Labels are trimmed and empty labels dropped; `null` means no genres.
pub(crate) fn genre_labels<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels = match Option::<GenreField>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(GenreField::Labels(labels)) => labels,
        Some(GenreField::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
    };

    Ok(labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect())
}

/// Deserialize an optional string, treating `""` the same as absent
pub(crate) fn non_empty_text<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(text.filter(|s| !s.trim().is_empty()))
}

// =============================================================================
// Ratings
// =============================================================================

/// Why a raw rating entry was left out of the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The key is not a movie id
    InvalidMovieId,
    /// An object entry without a numeric `rating` field
    MissingRating,
    /// Neither a number nor an object
    UnsupportedValue,
}

impl DropReason {
    pub fn describe(&self) -> &'static str {
        match self {
            DropReason::InvalidMovieId => "key is not a movie id",
            DropReason::MissingRating => "object has no numeric rating",
            DropReason::UnsupportedValue => "value is neither a number nor an object",
        }
    }
}

/// One raw entry that did not make it into the snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRating {
    pub key: String,
    pub reason: DropReason,
}

/// Result of decoding a ratings document
#[derive(Debug, Clone, Default)]
pub struct ParsedRatings {
    pub snapshot: UserRatingsSnapshot,
    pub dropped: Vec<DroppedRating>,
}

/// Parse a ratings document from a JSON string.
///
/// The root may be the `movies` map itself, a whole user record containing a
/// `movies` field, or `null` (a user with no ratings).
pub fn parse_user_ratings(json: &str) -> Result<ParsedRatings> {
    let value: Value = serde_json::from_str(json).map_err(|source| DataLoadError::Json {
        document: "ratings",
        source,
    })?;
    parse_user_ratings_value(&value)
}

/// Parse a ratings document from a file
pub fn parse_user_ratings_file(path: &Path) -> Result<ParsedRatings> {
    parse_user_ratings(&read_document(path)?)
}

/// Parse an already-decoded ratings document
pub fn parse_user_ratings_value(value: &Value) -> Result<ParsedRatings> {
    match value {
        Value::Null => Ok(ParsedRatings::default()),
        Value::Object(map) => match map.get("movies") {
            Some(Value::Object(movies)) => Ok(parse_movies_map(movies)),
            Some(Value::Null) => Ok(ParsedRatings::default()),
            Some(Value::Array(items)) => Ok(parse_movies_array(items)),
            _ => Ok(parse_movies_map(map)),
        },
        // The store turns maps with small, dense integer keys into arrays
        Value::Array(items) => Ok(parse_movies_array(items)),
        other => Err(DataLoadError::UnexpectedShape {
            document: "ratings",
            found: json_kind(other),
        }),
    }
}

fn parse_movies_map(movies: &Map<String, Value>) -> ParsedRatings {
    let mut parsed = ParsedRatings::default();

    for (key, raw) in movies {
        let Ok(movie_id) = key.trim().parse::<MovieId>() else {
            drop_entry(&mut parsed, key, DropReason::InvalidMovieId);
            continue;
        };
        match decode_entry(raw) {
            Ok(entry) => {
                parsed.snapshot.insert(movie_id, entry);
            }
            Err(reason) => drop_entry(&mut parsed, key, reason),
        }
    }

    debug!(
        "Decoded {} ratings ({} dropped)",
        parsed.snapshot.len(),
        parsed.dropped.len()
    );
    parsed
}

fn parse_movies_array(items: &[Value]) -> ParsedRatings {
    let mut parsed = ParsedRatings::default();

    for (idx, raw) in items.iter().enumerate() {
        if raw.is_null() {
            continue;
        }
        let key = idx.to_string();
        let Ok(movie_id) = MovieId::try_from(idx) else {
            drop_entry(&mut parsed, &key, DropReason::InvalidMovieId);
            continue;
        };
        match decode_entry(raw) {
            Ok(entry) => {
                parsed.snapshot.insert(movie_id, entry);
            }
            Err(reason) => drop_entry(&mut parsed, &key, reason),
        }
    }
    parsed
}

/// Decode one raw value in either the legacy or the current format
fn decode_entry(raw: &Value) -> std::result::Result<RatingEntry, DropReason> {
    match raw {
        Value::Number(n) => n.as_f64().map(RatingEntry::new).ok_or(DropReason::UnsupportedValue),
        Value::Object(fields) => {
            let rating = fields
                .get("rating")
                .and_then(Value::as_f64)
                .ok_or(DropReason::MissingRating)?;
            // A non-string timestamp is ignored, the rating itself is kept
            let rated_at = fields
                .get("rated_at")
                .and_then(Value::as_str)
                .map(str::to_string);
            Ok(RatingEntry { rating, rated_at })
        }
        _ => Err(DropReason::UnsupportedValue),
    }
}

fn drop_entry(parsed: &mut ParsedRatings, key: &str, reason: DropReason) {
    warn!("Dropping rating entry {:?}: {}", key, reason.describe());
    parsed.dropped.push(DroppedRating {
        key: key.to_string(),
        reason,
    });
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_genre_forms() {
        let json = r#"[
            {"id": 1, "title": "Heat", "genres": ["Action", "Crime"], "poster_path": "/heat.jpg"},
            {"id": 2, "title": "Amelie", "genres": "Comedy, Romance", "poster_path": ""},
            {"id": 3, "title": "Untitled"}
        ]"#;

        let movies = parse_catalog(json).unwrap();
        assert_eq!(movies.len(), 3);
        assert_eq!(movies[0].genres, vec!["Action", "Crime"]);
        assert_eq!(movies[0].poster_path.as_deref(), Some("/heat.jpg"));
        assert_eq!(movies[1].genres, vec!["Comedy", "Romance"]);
        assert_eq!(movies[1].poster_path, None);
        assert!(movies[2].genres.is_empty());
    }

    #[test]
    fn test_parse_catalog_rejects_garbage() {
        let err = parse_catalog(r#"{"id": 1}"#).unwrap_err();
        assert!(matches!(err, DataLoadError::Json { document: "catalog", .. }));
    }

    #[test]
    fn test_parse_ratings_both_formats() {
        let json = r#"{
            "10": 4.5,
            "20": {"rating": 3.0, "rated_at": "2024-03-02T18:00:00.000Z"},
            "30": {"rating": 2.5, "rated_at": 1700000000}
        }"#;

        let parsed = parse_user_ratings(json).unwrap();
        assert!(parsed.dropped.is_empty());
        assert_eq!(parsed.snapshot.len(), 3);
        assert_eq!(parsed.snapshot.get(10), Some(&RatingEntry::new(4.5)));
        assert_eq!(
            parsed.snapshot.get(20).unwrap().rated_at.as_deref(),
            Some("2024-03-02T18:00:00.000Z")
        );
        // non-string timestamp ignored, rating kept
        assert_eq!(parsed.snapshot.get(30), Some(&RatingEntry::new(2.5)));
    }

    #[test]
    fn test_parse_ratings_drop_policy() {
        let json = r#"{
            "1": 4.0,
            "abc": 3.0,
            "2": {"rated_at": "2024-01-01"},
            "3": "five",
            "4": [1, 2]
        }"#;

        let parsed = parse_user_ratings(json).unwrap();
        assert_eq!(parsed.snapshot.len(), 1);
        assert_eq!(parsed.dropped.len(), 4);

        let reason_for = |key: &str| {
            parsed
                .dropped
                .iter()
                .find(|d| d.key == key)
                .map(|d| d.reason)
        };
        assert_eq!(reason_for("abc"), Some(DropReason::InvalidMovieId));
        assert_eq!(reason_for("2"), Some(DropReason::MissingRating));
        assert_eq!(reason_for("3"), Some(DropReason::UnsupportedValue));
        assert_eq!(reason_for("4"), Some(DropReason::UnsupportedValue));
    }

    #[test]
    fn test_parse_ratings_user_record_and_null() {
        let parsed = parse_user_ratings(r#"{"email": "a@b.c", "movies": {"7": 1.5}}"#).unwrap();
        assert_eq!(parsed.snapshot.len(), 1);
        assert!(parsed.snapshot.contains(7));

        let parsed = parse_user_ratings("null").unwrap();
        assert!(parsed.snapshot.is_empty());

        let parsed = parse_user_ratings(r#"{"movies": null}"#).unwrap();
        assert!(parsed.snapshot.is_empty());
    }

    #[test]
    fn test_parse_ratings_array_form() {
        let parsed = parse_user_ratings("[null, 5.0, null, {\"rating\": 2.0}]").unwrap();
        assert_eq!(parsed.snapshot.len(), 2);
        assert_eq!(parsed.snapshot.get(1).unwrap().rating, 5.0);
        assert_eq!(parsed.snapshot.get(3).unwrap().rating, 2.0);
    }

    #[test]
    fn test_parse_ratings_unexpected_root() {
        let err = parse_user_ratings("42").unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::UnexpectedShape { found: "a number", .. }
        ));
    }
}
