use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::tree::NodeId;

/// Deterministic hash of an absolute URL string
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(url: &str) -> Self {
        Fingerprint(*blake3::hash(url.as_bytes()).as_bytes())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// URLs already claimed in the current run.
///
/// A URL is marked before it is fetched, so a failed fetch is never retried
/// and link cycles cannot cause refetching.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    seen: HashSet<Fingerprint>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.seen.clear();
    }

    /// Marks `url` and returns true, or returns false if it was already marked
    pub fn try_mark(&mut self, url: &str) -> bool {
        self.seen.insert(Fingerprint::of(url))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(&Fingerprint::of(url))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Mutable state of one run
#[derive(Debug, Default)]
pub struct RunState {
    pub visited: VisitedRegistry,
    /// Nodes that matched a keyword, in discovery order
    pub matches: BTreeSet<NodeId>,
    /// Fetch attempts, the seed included
    pub fetch_count: usize,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.visited.reset();
        self.matches.clear();
        self.fetch_count = 0;
    }
}
