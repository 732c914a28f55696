use relevance_core::store::{posting_key, DocSizeRecord, TokenCountRecord, DOCSIZE_TREE, TOKEN_INDEX_TREE};
use relevance_core::{IndexStore, SearchConfig, SearchEngine, SearchError, SledStore};
use std::sync::Arc;
use tempfile::tempdir;

fn put_posting(db: &sled::Db, docid: &str, token: &str, count: u32) {
    let tree = db.open_tree(TOKEN_INDEX_TREE).unwrap();
    let rec = TokenCountRecord { docid: docid.into(), token: token.into(), tokencount: count };
    tree.insert(posting_key(token, docid), serde_json::to_vec(&rec).unwrap()).unwrap();
}

fn put_size(db: &sled::Db, docid: &str, size: u64) {
    let tree = db.open_tree(DOCSIZE_TREE).unwrap();
    let rec = DocSizeRecord { docid: docid.into(), size };
    tree.insert(docid.as_bytes(), serde_json::to_vec(&rec).unwrap()).unwrap();
}

fn tiny_library(db: &sled::Db) {
    put_size(db, "austen-emma", 1000);
    put_size(db, "bible-kjv", 4000);
    put_size(db, "melville-moby_dick", 2000);
    put_posting(db, "bible-kjv", "age", 42);
    put_posting(db, "austen-emma", "age", 21);
    put_posting(db, "melville-moby_dick", "whale", 90);
}

#[test]
fn reads_postings_sizes_and_count() {
    let dir = tempdir().unwrap();
    let db = sled::open(dir.path()).unwrap();
    tiny_library(&db);
    let store = SledStore::from_db(db).unwrap();

    let mut age = store.postings("age").unwrap();
    age.sort_by(|a, b| a.docid.cmp(&b.docid));
    let docs: Vec<(&str, u32)> = age.iter().map(|p| (p.docid.as_str(), p.term_count)).collect();
    assert_eq!(docs, vec![("austen-emma", 21), ("bible-kjv", 42)]);
    assert!(store.postings("zeppelin").unwrap().is_empty());

    assert_eq!(store.document_size("bible-kjv").unwrap(), 4000);
    assert_eq!(store.document_count().unwrap(), 3);
    assert_eq!(store.document_size("ghost").unwrap_err(), SearchError::DocumentNotFound("ghost".into()));
}

#[test]
fn malformed_postings_are_skipped() {
    let dir = tempdir().unwrap();
    let db = sled::open(dir.path()).unwrap();
    tiny_library(&db);
    let store = SledStore::from_db(db).unwrap();
    let tree = store.db().open_tree(TOKEN_INDEX_TREE).unwrap();
    tree.insert(posting_key("age", "broken"), &br#"{"docid":"broken","token":"age","tokencount":"lots"}"#[..]).unwrap();
    tree.insert(posting_key("age", "garbage"), &b"\xff\x00not json"[..]).unwrap();

    let age = store.postings("age").unwrap();
    assert_eq!(age.len(), 2);
    assert!(age.iter().all(|p| p.term_count > 0));
}

#[test]
fn malformed_size_record_counts_as_missing() {
    let dir = tempdir().unwrap();
    let db = sled::open(dir.path()).unwrap();
    let tree = db.open_tree(DOCSIZE_TREE).unwrap();
    tree.insert("emma", &br#"{"docid":"emma","size":"big"}"#[..]).unwrap();
    let store = SledStore::from_db(db).unwrap();
    assert!(matches!(store.document_size("emma"), Err(SearchError::DocumentNotFound(_))));
}

#[tokio::test]
async fn engine_ranks_from_sled() {
    let dir = tempdir().unwrap();
    let db = sled::open(dir.path()).unwrap();
    tiny_library(&db);
    let engine = SearchEngine::new(Arc::new(SledStore::from_db(db).unwrap()), SearchConfig::default());

    let out = engine.search_top(&["age".to_string(), "whale".to_string()]).await.unwrap();
    let ids: Vec<&str> = out.iter().map(|r| r.docid.as_str()).collect();
    assert_eq!(ids, vec!["melville-moby_dick", "austen-emma", "bible-kjv"]);
    assert!(out.iter().all(|r| r.score > 0.0));
}

#[tokio::test]
async fn dangling_posting_fails_the_query() {
    let dir = tempdir().unwrap();
    let db = sled::open(dir.path()).unwrap();
    tiny_library(&db);
    put_posting(&db, "lost-gospel", "whale", 1);
    let engine = SearchEngine::new(Arc::new(SledStore::from_db(db).unwrap()), SearchConfig::default());

    let err = engine.search_top(&["whale".to_string()]).await.unwrap_err();
    assert_eq!(err, SearchError::DocumentNotFound("lost-gospel".into()));
}
