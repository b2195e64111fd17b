//! Depth-first crawl frontier
//!
//! The frontier owns the only mutable crawl state: the work stack and the
//! per-identity [`UrlState`] map. It is a plain owned value held by the
//! coordinator, so independent crawls in one process never share state.
//!
//! Traversal is last-discovered-first: links found on a page are pushed on top
//! of everything queued earlier, so the crawl descends into a subtree before
//! sweeping its siblings.

use crate::state::UrlState;
use std::collections::HashMap;
use url::Url;

/// A URL waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL identity
    pub url: Url,

    /// Link distance from the seed (seed is 0)
    pub depth: u32,

    /// Discovery sequence number, unique within a run
    pub order: u64,
}

/// Work stack plus visited set
#[derive(Debug)]
pub struct Frontier {
    /// Pending entries; the top of the stack is the end of the vector
    stack: Vec<FrontierEntry>,

    /// State per identity; absent means unseen
    states: HashMap<String, UrlState>,

    /// Next discovery sequence number
    next_order: u64,

    /// Entries deeper than this are never queued
    max_depth: Option<u32>,

    /// Stop handing out entries after this many pops
    max_pages: Option<u32>,

    /// Entries handed out so far
    popped: u32,
}

impl Frontier {
    /// Creates an unbounded frontier seeded with `seed` at depth 0
    pub fn new(seed: Url) -> Self {
        Self::with_limits(seed, None, None)
    }

    /// Creates a frontier with optional depth and page limits
    pub fn with_limits(seed: Url, max_depth: Option<u32>, max_pages: Option<u32>) -> Self {
        let mut frontier = Self {
            stack: Vec::new(),
            states: HashMap::new(),
            next_order: 0,
            max_depth,
            max_pages,
            popped: 0,
        };
        frontier.push(seed, 0);
        frontier
    }

    /// Queues an identity if it has never been seen
    ///
    /// Returns true if the identity moved from unseen to queued.
    pub fn push(&mut self, url: Url, depth: u32) -> bool {
        if self.max_depth.is_some_and(|max| depth > max) {
            tracing::trace!("Not queueing {} at depth {}: beyond max depth", url, depth);
            return false;
        }

        if self.states.contains_key(url.as_str()) {
            return false;
        }

        self.states.insert(url.as_str().to_string(), UrlState::Queued);
        self.stack.push(FrontierEntry {
            url,
            depth,
            order: self.next_order,
        });
        self.next_order += 1;
        true
    }

    /// Queues every unseen identity from a page's links, in discovery order
    ///
    /// The last link pushed is the first one popped. Returns how many
    /// identities were newly queued.
    pub fn push_discovered<I>(&mut self, links: I, depth: u32) -> usize
    where
        I: IntoIterator<Item = Url>,
    {
        links
            .into_iter()
            .filter(|url| self.push(url.clone(), depth))
            .count()
    }

    /// Takes the next entry to crawl
    ///
    /// Returns `None` when the stack is drained or the page limit is reached.
    /// Entries whose identity was already marked visited (as a redirect
    /// target) are discarded.
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        if self.max_pages.is_some_and(|max| self.popped >= max) {
            return None;
        }

        while let Some(entry) = self.stack.pop() {
            if self.state(&entry.url) == Some(UrlState::Queued) {
                self.popped += 1;
                return Some(entry);
            }
        }

        None
    }

    /// Marks a queued identity as visited once its crawl step completes
    ///
    /// Returns false if the identity was not in the queued state.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        match self.states.get_mut(url.as_str()) {
            Some(state) if state.can_transition_to(UrlState::Visited) => {
                *state = UrlState::Visited;
                true
            }
            _ => false,
        }
    }

    /// Records that a fetch was answered from `url` after redirects
    ///
    /// A queued identity becomes visited and is dropped from the stack on its
    /// next pop; an unseen identity is marked visited so it is never queued.
    pub fn mark_redirect_target(&mut self, url: &Url) {
        self.states
            .insert(url.as_str().to_string(), UrlState::Visited);
    }

    /// Current state of an identity; `None` means unseen
    pub fn state(&self, url: &Url) -> Option<UrlState> {
        self.states.get(url.as_str()).copied()
    }

    /// Number of entries still on the stack
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns whether the stack is empty
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Number of identities that reached the visited state
    pub fn visited_count(&self) -> usize {
        self.states.values().filter(|s| s.is_visited()).count()
    }
}
