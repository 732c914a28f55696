//! Posting-list retrieval: one index lookup per distinct query token.

use crate::error::Result;
use crate::store::{join, IndexStore};
use crate::{Posting, QueryPostings, Token};
use std::collections::HashSet;
use std::sync::Arc;

/// Distinct tokens in first-occurrence order.
pub fn distinct_tokens(tokens: &[Token]) -> Vec<Token> {
    let mut seen: HashSet<&str> = HashSet::new();
    tokens.iter().filter(|t| seen.insert(t.as_str())).cloned().collect()
}

/// Fetches the postings for a single token, dropping any with a zero count.
pub fn fetch_postings(store: &dyn IndexStore, token: &str) -> Result<Vec<Posting>> {
    let mut postings = store.postings(token)?;
    postings.retain(|p| {
        if p.term_count == 0 {
            tracing::warn!(token, docid = %p.docid, "dropping posting with zero term count");
        }
        p.term_count > 0
    });
    Ok(postings)
}

/// Fetches postings for every distinct token concurrently and indexes them by
/// token and by document. Any failed lookup fails the whole retrieval.
pub async fn retrieve_postings(store: &Arc<dyn IndexStore>, tokens: &[Token]) -> Result<QueryPostings> {
    let handles: Vec<_> = distinct_tokens(tokens)
        .into_iter()
        .map(|token| {
            let store = Arc::clone(store);
            let lookup = token.clone();
            (token, tokio::task::spawn_blocking(move || fetch_postings(store.as_ref(), &lookup)))
        })
        .collect();

    let mut fetched = Vec::with_capacity(handles.len());
    for (token, handle) in handles {
        let postings = join(handle).await?;
        tracing::debug!(token = %token, postings = postings.len(), "fetched postings");
        fetched.push((token, postings));
    }
    Ok(QueryPostings::from_fetched(fetched))
}
