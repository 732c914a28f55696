//! TF-IDF document ranking over an inverted index held in a key-value store.
//!
//! Query tokens flow through [`fetch`] (posting lists per token), [`stats`]
//! (document sizes and corpus size, cached per query), [`scorer`] (tf-idf per
//! posting, summed per document) and [`rank`] (top-K). [`engine::SearchEngine`]
//! wires the stages together behind a timeout.

pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod index;
pub mod memory;
pub mod rank;
pub mod scorer;
pub mod stats;
pub mod store;
pub mod tokenizer;

pub use config::SearchConfig;
pub use engine::{SearchEngine, SearchOutcome};
pub use error::{Result, SearchError};
pub use index::{DocId, Posting, QueryPostings, RankedDoc, Token};
pub use memory::MemoryStore;
pub use store::{IndexStore, SledStore};
