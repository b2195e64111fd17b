use std::fmt;

/// Lifecycle of a URL identity within one crawl run
///
/// Identities that were never discovered have no state at all ("unseen").
/// The only legal transitions are unseen → `Queued` → `Visited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Discovered and waiting in the frontier
    Queued,

    /// Crawl step finished, whatever its outcome
    Visited,
}

impl UrlState {
    /// Returns true once the identity has been crawled
    pub fn is_visited(&self) -> bool {
        matches!(self, Self::Visited)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        matches!((self, next), (Self::Queued, Self::Visited))
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Visited => write!(f, "visited"),
        }
    }
}
