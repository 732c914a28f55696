use crate::DocId;

/// Failures surfaced by the retrieval pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The store could not be reached or did not answer in time. Retryable.
    #[error("index store unavailable: {0}")]
    StoreUnavailable(String),
    /// A stored record could not be decoded. Callers drop the record and continue.
    #[error("malformed {kind} record at key {key:?}: {reason}")]
    MalformedRecord { kind: &'static str, key: String, reason: String },
    /// A posting references a document that has no size record.
    #[error("document not found: {0}")]
    DocumentNotFound(DocId),
}

impl SearchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
