//! Pagination state of one recommendation feed session.
//!
//! A session accumulates pages in request order, skipping movies it has
//! already shown, until the service returns an empty page. `fetch_in_flight`
//! is the only gate between fetches: while it is set, further requests are
//! refused rather than queued.
//!
//! Every reset starts a new generation. A fetch started in an earlier
//! generation can still complete, but its page is discarded.

use crate::error::FetchError;
use crate::types::RecommendedMovie;
use data_loader::{MovieId, UserRatingsSnapshot};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Permission to fetch one page, tied to the generation that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    generation: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Why a fetch request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A fetch for this session is already running
    InFlight,
    /// The service already returned an empty page
    Exhausted,
}

/// What a fetch request did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// A non-empty page was merged
    Appended {
        page: u32,
        added: usize,
        total: usize,
    },
    /// The service returned an empty page; the session is finished
    Exhausted,
    /// Nothing was fetched
    Skipped(SkipReason),
    /// The response belonged to a session that has since been reset
    Stale,
}

/// Copy of a session's observable state
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub accumulated: Vec<RecommendedMovie>,
    pub next_page: u32,
    pub exhausted: bool,
    pub fetch_in_flight: bool,
}

#[derive(Debug)]
pub struct FeedSession {
    accumulated: Vec<RecommendedMovie>,
    seen: HashSet<MovieId>,
    next_page: u32,
    exhausted: bool,
    fetch_in_flight: bool,
    generation: u64,
    snapshot_version: Option<u64>,
    ratings: Arc<UserRatingsSnapshot>,
    per_page: u32,
}

impl FeedSession {
    /// A fresh session over an empty ratings snapshot
    pub fn new(per_page: u32) -> Self {
        Self {
            accumulated: Vec::new(),
            seen: HashSet::new(),
            next_page: 0,
            exhausted: false,
            fetch_in_flight: false,
            generation: 0,
            snapshot_version: None,
            ratings: Arc::new(UserRatingsSnapshot::new()),
            per_page: per_page.max(1),
        }
    }

    /// Start over for a (possibly new) ratings snapshot.
    ///
    /// Called whenever the consuming view becomes active again or the
    /// snapshot changes; always resets, even for the same version.
    pub fn activate(&mut self, snapshot_version: u64, ratings: Arc<UserRatingsSnapshot>) {
        self.reset();
        self.snapshot_version = Some(snapshot_version);
        self.ratings = ratings;
    }

    /// Discard everything accumulated and return to the fresh state.
    ///
    /// A fetch still running belongs to the previous generation; its result
    /// will be reported as [`FeedOutcome::Stale`].
    pub fn reset(&mut self) {
        self.accumulated.clear();
        self.seen.clear();
        self.next_page = 0;
        self.exhausted = false;
        self.fetch_in_flight = false;
        self.generation += 1;
        debug!("Feed session reset to generation {}", self.generation);
    }

    /// Claim the next page, or say why no fetch should happen now
    pub fn begin_fetch(&mut self) -> Result<PageTicket, SkipReason> {
        if self.exhausted {
            return Err(SkipReason::Exhausted);
        }
        if self.fetch_in_flight {
            return Err(SkipReason::InFlight);
        }
        self.fetch_in_flight = true;
        Ok(PageTicket {
            generation: self.generation,
            page: self.next_page,
            per_page: self.per_page,
        })
    }

    /// Apply the result of the fetch a ticket was issued for.
    ///
    /// Errors are handed back unchanged after clearing the in-flight flag;
    /// the next ticket will ask for the same page again.
    pub fn complete(
        &mut self,
        ticket: PageTicket,
        result: Result<Vec<RecommendedMovie>, FetchError>,
    ) -> Result<FeedOutcome, FetchError> {
        if ticket.generation != self.generation {
            debug!(
                "Discarding page {} from generation {} (current {})",
                ticket.page, ticket.generation, self.generation
            );
            return Ok(FeedOutcome::Stale);
        }
        self.fetch_in_flight = false;

        let page = result?;
        if page.is_empty() {
            debug!("Page {} empty, feed exhausted", ticket.page);
            self.exhausted = true;
            return Ok(FeedOutcome::Exhausted);
        }

        let before = self.accumulated.len();
        for movie in page {
            if self.seen.insert(movie.id) {
                self.accumulated.push(movie);
            }
        }
        self.next_page = ticket.page + 1;

        let added = self.accumulated.len() - before;
        debug!(
            "Merged page {}: {} new movies, {} total",
            ticket.page,
            added,
            self.accumulated.len()
        );
        Ok(FeedOutcome::Appended {
            page: ticket.page,
            added,
            total: self.accumulated.len(),
        })
    }

    pub fn accumulated(&self) -> &[RecommendedMovie] {
        &self.accumulated
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn snapshot_version(&self) -> Option<u64> {
        self.snapshot_version
    }

    /// Ratings the current generation fetches recommendations for
    pub fn ratings(&self) -> &Arc<UserRatingsSnapshot> {
        &self.ratings
    }

    pub fn state(&self) -> FeedState {
        FeedState {
            accumulated: self.accumulated.clone(),
            next_page: self.next_page,
            exhausted: self.exhausted,
            fetch_in_flight: self.fetch_in_flight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[MovieId]) -> Vec<RecommendedMovie> {
        ids.iter()
            .map(|&id| RecommendedMovie::new(id, format!("Movie {}", id)))
            .collect()
    }

    fn ids(session: &FeedSession) -> Vec<MovieId> {
        session.accumulated().iter().map(|m| m.id).collect()
    }

    fn fetch(session: &mut FeedSession, ids: &[MovieId]) -> FeedOutcome {
        let ticket = session.begin_fetch().unwrap();
        session.complete(ticket, Ok(page(ids))).unwrap()
    }

    #[test]
    fn test_fresh_session() {
        let session = FeedSession::new(5);
        assert!(session.accumulated().is_empty());
        assert_eq!(session.next_page(), 0);
        assert!(!session.is_exhausted());
        assert!(!session.is_fetch_in_flight());
        assert_eq!(session.snapshot_version(), None);
    }

    #[test]
    fn test_pages_deduplicate_in_order() {
        let mut session = FeedSession::new(2);

        assert_eq!(
            fetch(&mut session, &[1, 2]),
            FeedOutcome::Appended { page: 0, added: 2, total: 2 }
        );
        assert_eq!(
            fetch(&mut session, &[2, 3]),
            FeedOutcome::Appended { page: 1, added: 1, total: 3 }
        );

        assert_eq!(ids(&session), vec![1, 2, 3]);
        assert_eq!(session.next_page(), 2);
    }

    #[test]
    fn test_duplicates_within_page_keep_first() {
        let mut session = FeedSession::new(5);
        let ticket = session.begin_fetch().unwrap();
        let mut movies = page(&[4, 5]);
        movies.push(RecommendedMovie::new(4, "Second copy"));
        session.complete(ticket, Ok(movies)).unwrap();

        assert_eq!(ids(&session), vec![4, 5]);
        assert_eq!(session.accumulated()[0].title, "Movie 4");
    }

    #[test]
    fn test_fully_duplicate_page_still_advances() {
        let mut session = FeedSession::new(2);
        fetch(&mut session, &[1, 2]);
        assert_eq!(
            fetch(&mut session, &[1, 2]),
            FeedOutcome::Appended { page: 1, added: 0, total: 2 }
        );
        assert_eq!(session.next_page(), 2);
        assert!(!session.is_exhausted());
    }

    #[test]
    fn test_empty_page_exhausts() {
        let mut session = FeedSession::new(2);
        fetch(&mut session, &[1]);
        assert_eq!(fetch(&mut session, &[]), FeedOutcome::Exhausted);

        assert!(session.is_exhausted());
        assert!(!session.is_fetch_in_flight());
        assert_eq!(session.begin_fetch(), Err(SkipReason::Exhausted));
        assert_eq!(ids(&session), vec![1]);
        assert_eq!(session.next_page(), 1);
    }

    #[test]
    fn test_in_flight_refuses_second_ticket() {
        let mut session = FeedSession::new(2);
        let ticket = session.begin_fetch().unwrap();

        assert!(session.is_fetch_in_flight());
        assert_eq!(session.begin_fetch(), Err(SkipReason::InFlight));

        session.complete(ticket, Ok(page(&[9]))).unwrap();
        assert!(session.begin_fetch().is_ok());
    }

    #[test]
    fn test_failure_keeps_state_and_retries_same_page() {
        let mut session = FeedSession::new(2);
        fetch(&mut session, &[1, 2]);

        let ticket = session.begin_fetch().unwrap();
        let err = session
            .complete(ticket, Err(FetchError::Unavailable("connection refused".into())))
            .unwrap_err();
        assert!(matches!(err, FetchError::Unavailable(_)));

        assert!(!session.is_fetch_in_flight());
        assert!(!session.is_exhausted());
        assert_eq!(ids(&session), vec![1, 2]);

        let retry = session.begin_fetch().unwrap();
        assert_eq!(retry.page, 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = FeedSession::new(2);
        fetch(&mut session, &[1, 2]);
        fetch(&mut session, &[]);
        assert!(session.is_exhausted());

        let mut ratings = UserRatingsSnapshot::new();
        ratings.rate(550, 4.0, None);
        session.activate(7, Arc::new(ratings));

        assert!(session.accumulated().is_empty());
        assert_eq!(session.next_page(), 0);
        assert!(!session.is_exhausted());
        assert_eq!(session.snapshot_version(), Some(7));
        assert_eq!(session.ratings().len(), 1);

        // previously seen ids are accepted again
        fetch(&mut session, &[1]);
        assert_eq!(ids(&session), vec![1]);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut session = FeedSession::new(2);
        let old = session.begin_fetch().unwrap();

        session.reset();
        let fresh = session.begin_fetch().unwrap();

        assert_eq!(
            session.complete(old, Ok(page(&[1, 2]))).unwrap(),
            FeedOutcome::Stale
        );
        assert!(session.accumulated().is_empty());
        // the stale completion does not release the current fetch
        assert!(session.is_fetch_in_flight());

        session.complete(fresh, Ok(page(&[3]))).unwrap();
        assert_eq!(ids(&session), vec![3]);
    }

    #[test]
    fn test_stale_failure_is_swallowed() {
        let mut session = FeedSession::new(2);
        let old = session.begin_fetch().unwrap();
        session.reset();

        let outcome = session
            .complete(old, Err(FetchError::Status { status: 503 }))
            .unwrap();
        assert_eq!(outcome, FeedOutcome::Stale);
    }
}
