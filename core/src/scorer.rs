//! TF-IDF relevance scoring.
//!
//! ```text
//! tf        = term_count / document_size
//! idf       = log10(corpus_document_count / token_occurrence_count)
//! tfidf     = scale * tf * idf
//! relevance = sum(tfidf over the document's postings) / query_token_count
//! ```

use crate::error::Result;
use crate::stats::DocumentStats;
use crate::{DocId, Posting, QueryPostings};
use std::collections::HashMap;

/// Scaled tf-idf of a single (document, token) pair.
///
/// `occurrence` must be >= 1; a token with no postings never reaches this point.
/// When the token occurs in every document the idf, and so the result, is 0.
pub fn tfidf(term_count: u32, doc_size: u64, corpus_count: u64, occurrence: usize, scale: f64) -> f64 {
    debug_assert!(occurrence >= 1);
    debug_assert!(doc_size >= 1);
    let idf = (corpus_count as f64 / occurrence as f64).log10();
    scale * term_count as f64 / doc_size as f64 * idf
}

#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    scale: f64,
}

impl Scorer {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    /// Scores one posting, reading document statistics through the query cache.
    pub async fn score(&self, posting: &Posting, occurrence: usize, stats: &DocumentStats) -> Result<f64> {
        let size = stats.document_size(&posting.docid).await?;
        let corpus = stats.corpus_document_count().await?;
        Ok(tfidf(posting.term_count, size, corpus, occurrence, self.scale))
    }

    /// Aggregates relevance for every document that matched at least one token.
    ///
    /// `query_token_count` is the normalization divisor and is passed in by the
    /// caller rather than derived from the postings.
    pub async fn score_documents(
        &self,
        postings: &QueryPostings,
        stats: &DocumentStats,
        query_token_count: usize,
    ) -> Result<HashMap<DocId, f64>> {
        let mut scores = HashMap::with_capacity(postings.by_document.len());
        if query_token_count == 0 || postings.by_document.is_empty() {
            return Ok(scores);
        }
        // Warm the cache with one concurrent batch; `score` then hits memory.
        stats.document_sizes(postings.by_document.keys()).await?;
        stats.corpus_document_count().await?;

        for (docid, doc_postings) in &postings.by_document {
            let mut relevance = 0.0;
            for p in doc_postings {
                relevance += self.score(p, postings.occurrence_count(&p.token), stats).await?;
            }
            scores.insert(docid.clone(), relevance / query_token_count as f64);
        }
        tracing::debug!(documents = scores.len(), query_token_count, "scored documents");
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::memory::MemoryStore;
    use crate::store::IndexStore;
    use std::sync::Arc;

    const SCALE: f64 = 1_000_000.0;

    #[test]
    fn tfidf_matches_reference_formula() {
        // 3 of 200 terms; token in 2 of 20 documents.
        let got = tfidf(3, 200, 20, 2, SCALE);
        assert!((got - 15_000.0).abs() < 1e-6, "got {got}");
    }

    #[test]
    fn token_in_every_document_scores_zero() {
        for count in [1, 7, 500] {
            assert_eq!(tfidf(count, 1000, 4, 4, SCALE), 0.0);
        }
    }

    #[tokio::test]
    async fn relevance_is_normalized_by_query_length() {
        let store: Arc<dyn IndexStore> = Arc::new(
            MemoryStore::new()
                .with_document("a", 100)
                .with_document("b", 100)
                .with_document("c", 100)
                .with_document("d", 100)
                .with_document("e", 100)
                .with_document("f", 100)
                .with_document("g", 100)
                .with_document("h", 100)
                .with_document("i", 100)
                .with_document("j", 100)
                .with_posting("a", "war", 10),
        );
        let qp = QueryPostings::from_fetched(vec![
            ("war".to_string(), store.postings("war").unwrap()),
            ("peace".to_string(), vec![]),
        ]);
        let stats = DocumentStats::new(store);
        let scores = Scorer::new(SCALE).score_documents(&qp, &stats, 2).await.unwrap();
        // tf = 0.1, idf = log10(10) = 1, scaled = 100_000, halved for two tokens.
        assert!((scores["a"] - 50_000.0).abs() < 1e-6);
        assert_eq!(scores.len(), 1);
    }

    #[tokio::test]
    async fn missing_size_aborts_scoring() {
        let store: Arc<dyn IndexStore> = Arc::new(MemoryStore::new().with_document("a", 10));
        let qp = QueryPostings::from_fetched(vec![(
            "age".to_string(),
            vec![Posting::new("a", "age", 1), Posting::new("orphan", "age", 1)],
        )]);
        let stats = DocumentStats::new(store);
        let err = Scorer::new(SCALE).score_documents(&qp, &stats, 1).await.unwrap_err();
        assert_eq!(err, SearchError::DocumentNotFound("orphan".into()));
    }
}
