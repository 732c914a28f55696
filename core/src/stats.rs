//! Document statistics with a cache scoped to a single query.
//!
//! The corpus size is read at most once per query. Document sizes are read at
//! most once per distinct document, however many query tokens it matches.
//! Nothing here outlives the query; reads are not transactional with the
//! posting fetches, so the corpus size may be slightly stale.

use crate::error::{Result, SearchError};
use crate::store::{join, IndexStore};
use crate::DocId;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::OnceCell;

pub struct DocumentStats {
    store: Arc<dyn IndexStore>,
    corpus_count: OnceCell<u64>,
    sizes: Mutex<HashMap<DocId, u64>>,
}

fn checked_size(docid: &str, size: u64) -> Result<u64> {
    if size == 0 {
        tracing::warn!(docid, "document has zero size");
        return Err(SearchError::DocumentNotFound(docid.to_string()));
    }
    Ok(size)
}

impl DocumentStats {
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self { store, corpus_count: OnceCell::new(), sizes: Mutex::new(HashMap::new()) }
    }

    pub async fn corpus_document_count(&self) -> Result<u64> {
        let store = Arc::clone(&self.store);
        self.corpus_count
            .get_or_try_init(|| async move {
                join(tokio::task::spawn_blocking(move || store.document_count())).await
            })
            .await
            .copied()
    }

    pub async fn document_size(&self, docid: &str) -> Result<u64> {
        let cached = self.sizes.lock().get(docid).copied();
        if let Some(size) = cached {
            return Ok(size);
        }
        let store = Arc::clone(&self.store);
        let lookup = docid.to_string();
        let size = join(tokio::task::spawn_blocking(move || store.document_size(&lookup))).await?;
        let size = checked_size(docid, size)?;
        self.sizes.lock().insert(docid.to_string(), size);
        Ok(size)
    }

    /// Resolves sizes for a set of documents, issuing one concurrent lookup per
    /// distinct uncached id. Fails if any document is missing.
    pub async fn document_sizes<'a, I>(&self, docids: I) -> Result<HashMap<DocId, u64>>
    where
        I: IntoIterator<Item = &'a DocId>,
    {
        let wanted: HashSet<&DocId> = docids.into_iter().collect();
        let missing: Vec<DocId> = {
            let cache = self.sizes.lock();
            wanted.iter().filter(|d| !cache.contains_key(d.as_str())).map(|d| (*d).clone()).collect()
        };

        let handles: Vec<_> = missing
            .into_iter()
            .map(|docid| {
                let store = Arc::clone(&self.store);
                let lookup = docid.clone();
                (docid, tokio::task::spawn_blocking(move || store.document_size(&lookup)))
            })
            .collect();
        for (docid, handle) in handles {
            let size = checked_size(&docid, join(handle).await?)?;
            self.sizes.lock().insert(docid, size);
        }

        let cache = self.sizes.lock();
        wanted
            .into_iter()
            .map(|d| {
                cache
                    .get(d.as_str())
                    .map(|s| (d.clone(), *s))
                    .ok_or_else(|| SearchError::DocumentNotFound(d.clone()))
            })
            .collect()
    }
}
