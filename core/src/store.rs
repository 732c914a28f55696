use crate::error::{Result, SearchError};
use crate::{DocId, Posting};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::task::JoinHandle;

/// Secondary index over token counts, keyed by `token \0 docid`.
pub const TOKEN_INDEX_TREE: &str = "token-docid-index";
/// Per-document total term counts, keyed by `docid`.
pub const DOCSIZE_TREE: &str = "tbl_docsize";

const KEY_SEP: u8 = 0;

/// Read access to a pre-built inverted index.
///
/// Implementations must be safe to call from several threads at once; the
/// engine issues independent lookups concurrently.
pub trait IndexStore: Send + Sync {
    /// All postings for `token`. Undecodable rows are skipped, never miscounted.
    fn postings(&self, token: &str) -> Result<Vec<Posting>>;
    /// Total term count of `docid`, or `DocumentNotFound`.
    fn document_size(&self, docid: &str) -> Result<u64>;
    /// Number of documents currently in the corpus.
    fn document_count(&self) -> Result<u64>;
}

/// Value stored under each key of [`TOKEN_INDEX_TREE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCountRecord {
    pub docid: DocId,
    pub token: String,
    pub tokencount: u32,
}

/// Value stored under each key of [`DOCSIZE_TREE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocSizeRecord {
    pub docid: DocId,
    pub size: u64,
}

pub fn posting_key(token: &str, docid: &str) -> Vec<u8> {
    let mut key = token_prefix(token);
    key.extend_from_slice(docid.as_bytes());
    key
}

fn token_prefix(token: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(token.len() + 1);
    key.extend_from_slice(token.as_bytes());
    key.push(KEY_SEP);
    key
}

fn malformed(kind: &'static str, key: &[u8], reason: impl ToString) -> SearchError {
    SearchError::MalformedRecord {
        kind,
        key: String::from_utf8_lossy(key).into_owned(),
        reason: reason.to_string(),
    }
}

/// Decodes one row of the token index into a posting, checking it against its key.
pub fn decode_posting(token: &str, key: &[u8], value: &[u8]) -> Result<Posting> {
    let rec: TokenCountRecord =
        serde_json::from_slice(value).map_err(|e| malformed("token count", key, e))?;
    if rec.token != token {
        return Err(malformed("token count", key, format!("record token {:?} does not match lookup", rec.token)));
    }
    let key_docid = key.get(token.len() + 1..).unwrap_or_default();
    if key_docid != rec.docid.as_bytes() {
        return Err(malformed("token count", key, format!("record docid {:?} does not match key", rec.docid)));
    }
    if rec.tokencount == 0 {
        return Err(malformed("token count", key, "tokencount must be positive"));
    }
    Ok(Posting { docid: rec.docid, token: rec.token, term_count: rec.tokencount })
}

pub fn decode_doc_size(docid: &str, value: &[u8]) -> Result<u64> {
    let rec: DocSizeRecord =
        serde_json::from_slice(value).map_err(|e| malformed("document size", docid.as_bytes(), e))?;
    if rec.docid != docid {
        return Err(malformed("document size", docid.as_bytes(), format!("record docid {:?} does not match key", rec.docid)));
    }
    if rec.size == 0 {
        return Err(malformed("document size", docid.as_bytes(), "size must be positive"));
    }
    Ok(rec.size)
}

/// Awaits a store call that was handed to the blocking pool.
pub(crate) async fn join<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle
        .await
        .map_err(|e| SearchError::StoreUnavailable(format!("store task failed: {e}")))?
}

fn unavailable(e: sled::Error) -> SearchError {
    SearchError::StoreUnavailable(e.to_string())
}

/// [`IndexStore`] over an embedded sled database.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    token_index: sled::Tree,
    docsize: sled::Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path).map_err(unavailable)?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self> {
        let token_index = db.open_tree(TOKEN_INDEX_TREE).map_err(unavailable)?;
        let docsize = db.open_tree(DOCSIZE_TREE).map_err(unavailable)?;
        Ok(Self { db, token_index, docsize })
    }

    /// Underlying database, for loading fixtures or admin tooling.
    pub fn db(&self) -> &sled::Db {
        &self.db
    }
}

impl IndexStore for SledStore {
    fn postings(&self, token: &str) -> Result<Vec<Posting>> {
        let mut out = Vec::new();
        for row in self.token_index.scan_prefix(token_prefix(token)) {
            let (key, value) = row.map_err(unavailable)?;
            match decode_posting(token, &key, &value) {
                Ok(p) => out.push(p),
                Err(e) => tracing::warn!(token, error = %e, "dropping malformed posting"),
            }
        }
        tracing::debug!(token, postings = out.len(), "index lookup");
        Ok(out)
    }

    fn document_size(&self, docid: &str) -> Result<u64> {
        let value = self
            .docsize
            .get(docid.as_bytes())
            .map_err(unavailable)?
            .ok_or_else(|| SearchError::DocumentNotFound(docid.to_string()))?;
        decode_doc_size(docid, &value).map_err(|e| {
            tracing::warn!(docid, error = %e, "dropping malformed document size");
            SearchError::DocumentNotFound(docid.to_string())
        })
    }

    fn document_count(&self) -> Result<u64> {
        Ok(self.docsize.len() as u64)
    }
}
