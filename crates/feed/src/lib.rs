//! # Feed Crate
//!
//! Incremental loading of movie recommendations from a remote service.
//!
//! ## Components
//!
//! - **service**: the [`RecommendationService`] capability and its HTTP client
//! - **session**: [`FeedSession`], the pagination state machine
//!   (accumulate, de-duplicate, exhaust, reset)
//! - **feed**: [`RecommendationFeed`], the async driver that calls the service
//!   and feeds results back into the session
//!
//! ## Example Usage
//!
//! ```ignore
//! use feed::{FeedConfig, HttpRecommendationService, RecommendationFeed};
//! use std::sync::Arc;
//!
//! let config = FeedConfig::new().with_endpoint("http://localhost:5000/recommend");
//! let service = HttpRecommendationService::new(&config)?;
//! let feed = RecommendationFeed::new(service, config.per_page);
//!
//! feed.activate(1, Arc::new(snapshot)).await?;
//! // user scrolled near the end of the list
//! feed.request_more().await?;
//! ```

pub mod error;
pub mod feed;
pub mod service;
pub mod session;
pub mod types;

pub use error::FetchError;
pub use feed::RecommendationFeed;
pub use service::{HttpRecommendationService, RecommendationService};
pub use session::{FeedOutcome, FeedSession, FeedState, PageTicket, SkipReason};
pub use types::{FeedConfig, RecommendRequest, RecommendedMovie};
