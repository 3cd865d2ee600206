use std::collections::HashSet;

/// Set of job URLs already persisted in this session.
///
/// Keys are compared as exact strings: `https://a/x` and `https://a/x/` are
/// two different jobs.
#[derive(Debug, Clone, Default)]
pub struct DedupStore {
    seen: HashSet<String>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn mark_seen(&mut self, url: impl Into<String>) {
        self.seen.insert(url.into());
    }

    /// Marks `url` as seen, returning `true` if it was not seen before.
    pub fn insert_if_new(&mut self, url: impl Into<String>) -> bool {
        self.seen.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
