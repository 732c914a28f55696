//! End-to-end query handling: fetch, score, rank.

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::fetch::{distinct_tokens, retrieve_postings};
use crate::rank::rank;
use crate::scorer::Scorer;
use crate::stats::DocumentStats;
use crate::store::IndexStore;
use crate::{RankedDoc, Token};
use std::sync::Arc;

/// A ranking plus the number of documents that matched before truncation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub total_hits: usize,
    pub results: Vec<RankedDoc>,
}

/// Ranks documents for tokenized queries against an injected store.
///
/// Holds no per-query state; concurrent calls to [`SearchEngine::search`] are
/// independent apart from sharing the store handle.
#[derive(Clone)]
pub struct SearchEngine {
    store: Arc<dyn IndexStore>,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn IndexStore>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Top `k` documents for `tokens`. An empty query yields an empty ranking.
    pub async fn search(&self, tokens: &[Token], k: usize) -> Result<Vec<RankedDoc>> {
        Ok(self.query(tokens, k).await?.results)
    }

    /// Same as [`SearchEngine::search`] with the configured top-K.
    pub async fn search_top(&self, tokens: &[Token]) -> Result<Vec<RankedDoc>> {
        self.search(tokens, self.config.top_k).await
    }

    /// Like [`SearchEngine::search`], also reporting how many documents matched.
    pub async fn query(&self, tokens: &[Token], k: usize) -> Result<SearchOutcome> {
        if tokens.is_empty() {
            return Ok(SearchOutcome::default());
        }
        let timeout = self.config.store_timeout;
        match tokio::time::timeout(timeout, self.run(tokens, k)).await {
            Ok(res) => res,
            Err(_) => {
                tracing::warn!(?timeout, "query timed out waiting on the store");
                Err(SearchError::StoreUnavailable(format!("no response within {timeout:?}")))
            }
        }
    }

    async fn run(&self, tokens: &[Token], k: usize) -> Result<SearchOutcome> {
        let query_token_count = distinct_tokens(tokens).len();
        let postings = retrieve_postings(&self.store, tokens).await?;
        let stats = DocumentStats::new(Arc::clone(&self.store));
        let scores = Scorer::new(self.config.scale).score_documents(&postings, &stats, query_token_count).await?;
        let total_hits = scores.len();
        let results = rank(scores, k);
        tracing::debug!(query_token_count, total_hits, returned = results.len(), "ranked query");
        Ok(SearchOutcome { total_hits, results })
    }
}
