use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A normalized query/index term. Treated as an opaque key.
pub type Token = String;
pub type DocId = String;

/// One (document, token) occurrence record fetched from the inverted index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub docid: DocId,
    pub token: Token,
    /// Occurrences of `token` in `docid`; always >= 1.
    pub term_count: u32,
}

impl Posting {
    pub fn new(docid: impl Into<DocId>, token: impl Into<Token>, term_count: u32) -> Self {
        Self { docid: docid.into(), token: token.into(), term_count }
    }
}

/// Postings fetched for a single query, indexed both ways.
#[derive(Debug, Default, Clone)]
pub struct QueryPostings {
    /// Exactly one entry per distinct query token, possibly empty.
    pub by_token: HashMap<Token, Vec<Posting>>,
    /// Postings grouped by document, sorted by token within each document.
    pub by_document: HashMap<DocId, Vec<Posting>>,
}

impl QueryPostings {
    /// Builds both maps from per-token fetch results. Each document's postings
    /// are kept in token order so that aggregation does not depend on the order
    /// tokens were fetched in.
    ///
    /// A token's list holds at most one posting per document; repeats are
    /// dropped (first wins) so they cannot inflate either tf or df.
    pub fn from_fetched(fetched: impl IntoIterator<Item = (Token, Vec<Posting>)>) -> Self {
        let mut by_token: HashMap<Token, Vec<Posting>> = HashMap::new();
        let mut by_document: HashMap<DocId, Vec<Posting>> = HashMap::new();
        for (token, postings) in fetched {
            let mut seen: HashSet<DocId> = HashSet::with_capacity(postings.len());
            let mut kept = Vec::with_capacity(postings.len());
            for p in postings {
                if !seen.insert(p.docid.clone()) {
                    tracing::warn!(token = %token, docid = %p.docid, "dropping duplicate posting");
                    continue;
                }
                by_document.entry(p.docid.clone()).or_default().push(p.clone());
                kept.push(p);
            }
            by_token.insert(token, kept);
        }
        for postings in by_document.values_mut() {
            postings.sort_by(|a, b| a.token.cmp(&b.token));
        }
        Self { by_token, by_document }
    }

    /// Number of distinct documents that contain `token` in this query's fetch.
    pub fn occurrence_count(&self, token: &str) -> usize {
        self.by_token.get(token).map(Vec::len).unwrap_or(0)
    }
}

/// A single entry of the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDoc {
    pub docid: DocId,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_by_document_in_token_order() {
        let qp = QueryPostings::from_fetched(vec![
            ("war".to_string(), vec![Posting::new("a", "war", 3)]),
            ("age".to_string(), vec![Posting::new("a", "age", 5), Posting::new("b", "age", 2)]),
        ]);
        let a: Vec<&str> = qp.by_document["a"].iter().map(|p| p.token.as_str()).collect();
        assert_eq!(a, vec!["age", "war"]);
        assert_eq!(qp.by_document["b"].len(), 1);
        assert_eq!(qp.occurrence_count("age"), 2);
    }

    #[test]
    fn repeated_document_counts_once() {
        let qp = QueryPostings::from_fetched(vec![(
            "war".to_string(),
            vec![Posting::new("a", "war", 10), Posting::new("b", "war", 1), Posting::new("a", "war", 7)],
        )]);
        assert_eq!(qp.occurrence_count("war"), 2);
        assert_eq!(qp.by_document["a"], vec![Posting::new("a", "war", 10)]);
    }

    #[test]
    fn keeps_tokens_without_postings() {
        let qp = QueryPostings::from_fetched(vec![("zzz".to_string(), vec![])]);
        assert!(qp.by_token["zzz"].is_empty());
        assert!(qp.by_document.is_empty());
        assert_eq!(qp.occurrence_count("zzz"), 0);
    }
}
