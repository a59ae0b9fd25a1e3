//! The recommendation capability and its HTTP implementation.

use crate::error::FetchError;
use crate::types::{FeedConfig, RecommendRequest, RecommendedMovie};
use async_trait::async_trait;
use data_loader::UserRatingsSnapshot;
use reqwest::Client as HttpClient;
use tracing::{debug, error, warn};

/// Source of recommendation pages.
///
/// An empty page means the service has nothing more to offer. Pages may
/// overlap; the feed de-duplicates.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Returns the name of this service (for logging/debugging)
    fn name(&self) -> &str;

    /// Fetch one page of recommendations for the given ratings
    async fn fetch_page(
        &self,
        ratings: &UserRatingsSnapshot,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RecommendedMovie>, FetchError>;
}

/// Client for the `POST /recommend` JSON endpoint
#[derive(Debug, Clone)]
pub struct HttpRecommendationService {
    http_client: HttpClient,
    endpoint: String,
}

impl HttpRecommendationService {
    pub fn new(config: &FeedConfig) -> Result<Self, FetchError> {
        let http_client = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RecommendationService for HttpRecommendationService {
    fn name(&self) -> &str {
        "HttpRecommendationService"
    }

    async fn fetch_page(
        &self,
        ratings: &UserRatingsSnapshot,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RecommendedMovie>, FetchError> {
        debug!(
            "Requesting page {} ({} per page) from {} for {} ratings",
            page,
            per_page,
            self.endpoint,
            ratings.len()
        );
        let body = RecommendRequest {
            user_ratings: ratings.rating_values(),
            page,
            per_page,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Recommendation request to {} failed: {}", self.endpoint, e);
                FetchError::Request(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Recommendation service answered {} for page {}", status, page);
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let movies: Vec<RecommendedMovie> = serde_json::from_slice(&bytes)?;
        debug!("Page {} returned {} movies", page, movies.len());
        Ok(movies)
    }
}
