//! Integration tests for `SqliteStore` against in-memory and on-disk
//! databases.

use companywise_core::{
  question::{Difficulty, QuestionRecord},
  store::{KeyValueStore, LEDGER_KEY, METADATA_KEY},
  tracker::SolvedTracker,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Raw key-value access ────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_key_returns_none() {
  let s = store().await;
  assert!(s.get("nothing-here").await.unwrap().is_none());
}

#[tokio::test]
async fn set_then_get_returns_bytes() {
  let s = store().await;
  s.set("k", b"hello".to_vec()).await.unwrap();
  assert_eq!(s.get("k").await.unwrap().as_deref(), Some(&b"hello"[..]));
}

#[tokio::test]
async fn set_replaces_previous_value() {
  let s = store().await;
  s.set("k", b"first".to_vec()).await.unwrap();
  s.set("k", b"second".to_vec()).await.unwrap();
  assert_eq!(s.get("k").await.unwrap(), Some(b"second".to_vec()));
}

#[tokio::test]
async fn keys_are_independent() {
  let s = store().await;
  s.set(LEDGER_KEY, b"{}".to_vec()).await.unwrap();
  s.set(METADATA_KEY, b"[]".to_vec()).await.unwrap();
  assert_eq!(s.get(LEDGER_KEY).await.unwrap(), Some(b"{}".to_vec()));
  assert_eq!(s.get(METADATA_KEY).await.unwrap(), Some(b"[]".to_vec()));
}

#[tokio::test]
async fn empty_value_is_distinct_from_missing() {
  let s = store().await;
  s.set("k", Vec::new()).await.unwrap();
  assert_eq!(s.get("k").await.unwrap(), Some(Vec::new()));
}

// ─── Through the tracker ─────────────────────────────────────────────────────

#[tokio::test]
async fn tracker_state_survives_reopening_the_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("progress.db");

  {
    let mut tracker = SolvedTracker::load(SqliteStore::open(&path).await.unwrap()).await;
    tracker.toggle("Acme", "1").await.unwrap();
    tracker
      .sync_metadata(
        "Acme",
        &[QuestionRecord::new("1", "Two Sum", Some(Difficulty::Easy))],
      )
      .await
      .unwrap();
  }

  let tracker = SolvedTracker::load(SqliteStore::open(&path).await.unwrap()).await;
  assert!(tracker.is_solved("Acme", "1"));
  assert_eq!(tracker.stats().difficulty_count(Difficulty::Easy), 1);
}

#[tokio::test]
async fn corrupt_ledger_row_loads_as_empty() {
  let s = store().await;
  s.set(LEDGER_KEY, b"\xff\xfe not json".to_vec()).await.unwrap();
  s.set(METADATA_KEY, br#"{"1":{"title":"Two Sum","difficulty":"Easy"}}"#.to_vec())
    .await
    .unwrap();

  let tracker = SolvedTracker::load(s).await;
  assert_eq!(tracker.stats().total_solved, 0);
  assert_eq!(tracker.cache().len(), 1);
}
