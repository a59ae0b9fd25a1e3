//! Wire types of the recommendation service and the feed configuration.

use data_loader::MovieId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One movie of a recommendation page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedMovie {
    pub id: MovieId,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub title: String,
    /// Genre text as the service formats it, e.g. `"Action, Thriller"`
    #[serde(default, deserialize_with = "text_or_empty")]
    pub genres: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub release_date: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub overview: String,
}

impl RecommendedMovie {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            genres: String::new(),
            release_date: String::new(),
            overview: String::new(),
        }
    }
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /recommend`
#[derive(Debug, Serialize)]
pub struct RecommendRequest {
    pub user_ratings: BTreeMap<MovieId, f64>,
    pub page: u32,
    pub per_page: u32,
}

/// Default recommendation endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/recommend";

/// Default number of movies requested per page
pub const DEFAULT_PER_PAGE: u32 = 5;

/// Settings for the recommendation feed and its HTTP client
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub endpoint: String,
    pub per_page: u32,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            per_page: DEFAULT_PER_PAGE,
            timeout: Duration::from_secs(10),
        }
    }
}

impl FeedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the service endpoint (default: `http://localhost:5000/recommend`)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Configure the page size (default: 5, at least 1)
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Configure the per-request timeout (default: 10s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
