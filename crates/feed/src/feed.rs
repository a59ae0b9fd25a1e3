//! Async driver tying a [`FeedSession`] to a [`RecommendationService`].
//!
//! The session lock is only held while reading or updating the session,
//! never across the network call; the session's in-flight flag is what keeps
//! a second fetch from starting.

use crate::error::FetchError;
use crate::service::RecommendationService;
use crate::session::{FeedOutcome, FeedSession, FeedState};
use crate::types::RecommendedMovie;
use data_loader::UserRatingsSnapshot;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// An incrementally loaded, de-duplicated recommendation list
pub struct RecommendationFeed<S> {
    service: S,
    session: Mutex<FeedSession>,
}

impl<S: RecommendationService> RecommendationFeed<S> {
    /// Create a feed with a fresh session
    ///
    /// # Arguments
    /// * `service` - Where pages come from
    /// * `per_page` - How many movies to ask for per page (at least 1)
    pub fn new(service: S, per_page: u32) -> Self {
        Self {
            service,
            session: Mutex::new(FeedSession::new(per_page)),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Reset for `ratings` and load the first page.
    ///
    /// Call when the consuming view becomes active or the user's ratings
    /// change. Any fetch still running for the previous session is discarded
    /// when it returns.
    #[instrument(skip(self, ratings), fields(service = self.service.name(), ratings = ratings.len()))]
    pub async fn activate(
        &self,
        snapshot_version: u64,
        ratings: Arc<UserRatingsSnapshot>,
    ) -> Result<FeedOutcome, FetchError> {
        info!("Activating recommendation feed");
        self.session.lock().await.activate(snapshot_version, ratings);
        self.request_more().await
    }

    /// Drop everything loaded so far without fetching
    pub async fn reset(&self) {
        self.session.lock().await.reset();
    }

    /// Fetch and merge the next page.
    ///
    /// Returns [`FeedOutcome::Skipped`] without calling the service when a
    /// fetch is already running or the feed is exhausted.
    pub async fn request_more(&self) -> Result<FeedOutcome, FetchError> {
        let (ticket, ratings) = {
            let mut session = self.session.lock().await;
            match session.begin_fetch() {
                Ok(ticket) => (ticket, Arc::clone(session.ratings())),
                Err(reason) => {
                    debug!("Skipping fetch: {:?}", reason);
                    return Ok(FeedOutcome::Skipped(reason));
                }
            }
        };

        let result = self
            .service
            .fetch_page(&ratings, ticket.page, ticket.per_page)
            .await;

        self.session.lock().await.complete(ticket, result)
    }

    /// Copy of the current session state
    pub async fn state(&self) -> FeedState {
        self.session.lock().await.state()
    }

    /// Movies loaded so far, in display order
    pub async fn accumulated(&self) -> Vec<RecommendedMovie> {
        self.session.lock().await.accumulated().to_vec()
    }
}
