use crate::error::{Result, SearchError};
use crate::store::IndexStore;
use crate::{DocId, Posting, Token};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory [`IndexStore`], mainly for tests. Counts every lookup it serves.
#[derive(Default)]
pub struct MemoryStore {
    postings: HashMap<Token, Vec<Posting>>,
    sizes: HashMap<DocId, u64>,
    posting_lookups: AtomicUsize,
    size_lookups: AtomicUsize,
    count_lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, docid: &str, size: u64) -> Self {
        self.sizes.insert(docid.to_string(), size);
        self
    }

    /// Adds or replaces the posting for (`docid`, `token`).
    pub fn with_posting(mut self, docid: &str, token: &str, term_count: u32) -> Self {
        let list = self.postings.entry(token.to_string()).or_default();
        match list.iter().position(|p| p.docid == docid) {
            Some(i) => list[i].term_count = term_count,
            None => list.push(Posting::new(docid, token, term_count)),
        }
        self
    }

    pub fn posting_lookups(&self) -> usize {
        self.posting_lookups.load(Ordering::Relaxed)
    }

    pub fn size_lookups(&self) -> usize {
        self.size_lookups.load(Ordering::Relaxed)
    }

    pub fn count_lookups(&self) -> usize {
        self.count_lookups.load(Ordering::Relaxed)
    }
}

impl IndexStore for MemoryStore {
    fn postings(&self, token: &str) -> Result<Vec<Posting>> {
        self.posting_lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.postings.get(token).cloned().unwrap_or_default())
    }

    fn document_size(&self, docid: &str) -> Result<u64> {
        self.size_lookups.fetch_add(1, Ordering::Relaxed);
        self.sizes.get(docid).copied().ok_or_else(|| SearchError::DocumentNotFound(docid.to_string()))
    }

    fn document_count(&self) -> Result<u64> {
        self.count_lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.sizes.len() as u64)
    }
}
