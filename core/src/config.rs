use std::time::Duration;

/// Number of results returned when the caller does not ask for a specific count.
pub const DEFAULT_TOP_K: usize = 5;
/// Display-magnitude multiplier applied to every tf-idf term.
pub const TFIDF_SCALE: f64 = 1_000_000.0;
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub top_k: usize,
    pub scale: f64,
    /// Upper bound on the time a whole query may spend waiting on the store.
    pub store_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K, scale: TFIDF_SCALE, store_timeout: DEFAULT_STORE_TIMEOUT }
    }
}
