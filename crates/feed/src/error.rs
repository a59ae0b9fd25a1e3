//! Errors surfaced while fetching recommendation pages.

use thiserror::Error;

/// A page fetch failed.
///
/// Always recoverable: the feed keeps what it has accumulated and the next
/// `request_more` retries the same page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Recommendation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Recommendation service returned status {status}")]
    Status { status: u16 },

    #[error("Invalid response from recommendation service: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Recommendation service unavailable: {0}")]
    Unavailable(String),
}
