//! [`SolvedTracker`] — the single owner of the solved ledger and its cache.
//!
//! The tracker loads both structures from a [`KeyValueStore`] at startup and
//! writes the whole structure back after every logical mutation. All
//! mutations take `&mut self`, so a flip and the persist that follows it
//! cannot interleave with another writer.

use serde::{Serialize, de::DeserializeOwned};

use crate::{
  Error, Result,
  ledger::{SolvedLedger, SolvedMetadataCache},
  question::QuestionRecord,
  stats::{self, Progress, SolvedStats},
  store::{KeyValueStore, LEDGER_KEY, METADATA_KEY},
};

pub struct SolvedTracker<S> {
  store:  S,
  ledger: SolvedLedger,
  cache:  SolvedMetadataCache,
}

impl<S: KeyValueStore> SolvedTracker<S> {
  /// Load the ledger and cache from `store`.
  ///
  /// Missing, unreadable or corrupt blobs yield empty structures; startup
  /// never fails because of persisted state.
  pub async fn load(store: S) -> Self {
    let ledger = read_or_default(&store, LEDGER_KEY).await;
    let cache = read_or_default(&store, METADATA_KEY).await;
    Self { store, ledger, cache }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn ledger(&self) -> &SolvedLedger { &self.ledger }

  pub fn cache(&self) -> &SolvedMetadataCache { &self.cache }

  pub fn is_solved(&self, employer: &str, id: &str) -> bool {
    self.ledger.is_solved(employer, id)
  }

  /// Flip `(employer, id)` and persist the full ledger.
  ///
  /// Returns the new solved flag. If the write fails the flip is undone and
  /// the store error is returned.
  pub async fn toggle(&mut self, employer: &str, id: &str) -> Result<bool> {
    let solved = self.ledger.toggle(employer, id);
    if let Err(e) = write(&self.store, LEDGER_KEY, &self.ledger).await {
      self.ledger.toggle(employer, id);
      return Err(e);
    }
    tracing::debug!(employer, id, solved, "toggled question");
    Ok(solved)
  }

  /// Cache metadata for solved questions in the loaded set.
  ///
  /// The cache is written only when something was added. Returns the number
  /// of new entries.
  pub async fn sync_metadata(
    &mut self,
    employer: &str,
    questions: &[QuestionRecord],
  ) -> Result<usize> {
    let additions = self.cache.missing(employer, questions, &self.ledger);
    if additions.is_empty() {
      return Ok(0);
    }
    let added = additions.len();
    let ids: Vec<String> = additions.keys().cloned().collect();
    self.cache.insert_all(additions);
    if let Err(e) = write(&self.store, METADATA_KEY, &self.cache).await {
      // Added ids were absent before, so removing them restores the cache.
      self.cache.remove_all(ids.iter().map(String::as_str));
      return Err(e);
    }
    tracing::debug!(employer, added, "cached solved metadata");
    Ok(added)
  }

  pub fn stats(&self) -> SolvedStats {
    stats::compute_stats(&self.ledger, &self.cache)
  }

  pub fn progress(&self, employer: &str, questions: &[QuestionRecord]) -> Progress {
    stats::progress(&self.ledger, employer, questions)
  }
}

async fn read_or_default<S, T>(store: &S, key: &str) -> T
where
  S: KeyValueStore,
  T: DeserializeOwned + Default,
{
  let bytes = match store.get(key).await {
    Ok(Some(bytes)) => bytes,
    Ok(None) => return T::default(),
    Err(e) => {
      tracing::warn!(key, "could not read persisted state, starting empty: {e}");
      return T::default();
    }
  };
  serde_json::from_slice(&bytes).unwrap_or_else(|e| {
    tracing::warn!(key, "discarding corrupt persisted state: {e}");
    T::default()
  })
}

async fn write<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
  S: KeyValueStore,
  T: Serialize,
{
  let bytes = serde_json::to_vec(value)?;
  store
    .set(key, bytes)
    .await
    .map_err(|e| Error::Store(Box::new(e)))
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    io,
    sync::{
      Mutex,
      atomic::{AtomicBool, AtomicUsize, Ordering},
    },
  };

  use super::*;
  use crate::question::Difficulty;

  #[derive(Default)]
  struct MemStore {
    blobs:       Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
    writes:      AtomicUsize,
  }

  impl MemStore {
    fn with(key: &str, value: &[u8]) -> Self {
      let store = Self::default();
      store.blobs.lock().unwrap().insert(key.to_owned(), value.to_vec());
      store
    }

    fn blob(&self, key: &str) -> Option<String> {
      self
        .blobs
        .lock()
        .unwrap()
        .get(key)
        .map(|b| String::from_utf8(b.clone()).unwrap())
    }
  }

  impl KeyValueStore for MemStore {
    type Error = io::Error;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, io::Error> {
      Ok(self.blobs.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), io::Error> {
      if self.fail_writes.load(Ordering::SeqCst) {
        return Err(io::Error::other("disk full"));
      }
      self.writes.fetch_add(1, Ordering::SeqCst);
      self.blobs.lock().unwrap().insert(key.to_owned(), value);
      Ok(())
    }
  }

  fn two_sum() -> Vec<QuestionRecord> {
    vec![
      QuestionRecord::new("1", "Two Sum", Some(Difficulty::Easy)),
      QuestionRecord::new("2", "Add Two Numbers", Some(Difficulty::Medium)),
    ]
  }

  #[tokio::test]
  async fn empty_store_loads_empty_state() {
    let tracker = SolvedTracker::load(MemStore::default()).await;
    assert_eq!(tracker.ledger(), &SolvedLedger::new());
    assert!(tracker.cache().is_empty());
  }

  #[tokio::test]
  async fn corrupt_blobs_load_as_empty() {
    let store = MemStore::with(LEDGER_KEY, b"{ definitely not json");
    store
      .blobs
      .lock()
      .unwrap()
      .insert(METADATA_KEY.to_owned(), b"[1, 2, 3]".to_vec());

    let tracker = SolvedTracker::load(store).await;
    assert_eq!(tracker.ledger(), &SolvedLedger::new());
    assert!(tracker.cache().is_empty());
  }

  #[tokio::test]
  async fn toggle_persists_full_ledger_every_time() {
    let mut tracker = SolvedTracker::load(MemStore::default()).await;

    assert!(tracker.toggle("Acme", "1").await.unwrap());
    assert!(tracker.toggle("Globex", "7").await.unwrap());
    assert_eq!(
      tracker.store().blob(LEDGER_KEY).unwrap(),
      r#"{"Acme":{"1":true},"Globex":{"7":true}}"#
    );
    assert_eq!(tracker.store().writes.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn persisted_state_survives_reload() {
    let mut tracker = SolvedTracker::load(MemStore::default()).await;
    tracker.toggle("Acme", "1").await.unwrap();
    tracker.sync_metadata("Acme", &two_sum()).await.unwrap();

    let reloaded = SolvedTracker::load(tracker.store).await;
    assert!(reloaded.is_solved("Acme", "1"));
    assert_eq!(reloaded.cache().get("1").unwrap().title, "Two Sum");
  }

  #[tokio::test]
  async fn toggle_twice_restores_flag_but_cache_remains() {
    let mut tracker = SolvedTracker::load(MemStore::default()).await;
    let questions = two_sum();

    tracker.toggle("Acme", "1").await.unwrap();
    assert_eq!(tracker.sync_metadata("Acme", &questions).await.unwrap(), 1);
    assert!(!tracker.toggle("Acme", "1").await.unwrap());
    assert_eq!(tracker.sync_metadata("Acme", &questions).await.unwrap(), 0);

    assert!(!tracker.is_solved("Acme", "1"));
    assert!(tracker.cache().get("1").is_some());
    assert_eq!(tracker.stats().total_solved, 0);
  }

  #[tokio::test]
  async fn sync_without_additions_does_not_write() {
    let mut tracker = SolvedTracker::load(MemStore::default()).await;
    tracker.toggle("Acme", "1").await.unwrap();
    tracker.sync_metadata("Acme", &two_sum()).await.unwrap();
    let writes = tracker.store().writes.load(Ordering::SeqCst);

    tracker.sync_metadata("Acme", &two_sum()).await.unwrap();
    tracker.sync_metadata("Globex", &two_sum()).await.unwrap();
    assert_eq!(tracker.store().writes.load(Ordering::SeqCst), writes);
  }

  #[tokio::test]
  async fn failed_write_reverts_toggle() {
    let mut tracker = SolvedTracker::load(MemStore::default()).await;
    tracker.store().fail_writes.store(true, Ordering::SeqCst);

    assert!(matches!(
      tracker.toggle("Acme", "1").await,
      Err(Error::Store(_))
    ));
    assert!(!tracker.is_solved("Acme", "1"));
    assert!(tracker.store().blob(LEDGER_KEY).is_none());
  }

  #[tokio::test]
  async fn failed_write_reverts_metadata_sync() {
    let mut tracker = SolvedTracker::load(MemStore::default()).await;
    tracker.toggle("Acme", "1").await.unwrap();
    tracker.store().fail_writes.store(true, Ordering::SeqCst);

    assert!(tracker.sync_metadata("Acme", &two_sum()).await.is_err());
    assert!(tracker.cache().is_empty());

    tracker.store().fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(tracker.sync_metadata("Acme", &two_sum()).await.unwrap(), 1);
  }

  #[tokio::test]
  async fn failed_metadata_write_keeps_earlier_entries() {
    let mut tracker = SolvedTracker::load(MemStore::default()).await;
    let questions = two_sum();
    tracker.toggle("Acme", "1").await.unwrap();
    tracker.sync_metadata("Acme", &questions).await.unwrap();

    tracker.toggle("Acme", "2").await.unwrap();
    tracker.store().fail_writes.store(true, Ordering::SeqCst);
    assert!(tracker.sync_metadata("Acme", &questions).await.is_err());

    assert_eq!(tracker.cache().len(), 1);
    assert_eq!(tracker.cache().get("1").unwrap().title, "Two Sum");
    assert!(tracker.cache().get("2").is_none());
    assert_eq!(
      tracker.store().blob(METADATA_KEY).unwrap(),
      r#"{"1":{"title":"Two Sum","difficulty":"Easy"}}"#
    );
  }

  #[tokio::test]
  async fn stats_and_progress_reflect_ledger() {
    let mut tracker = SolvedTracker::load(MemStore::default()).await;
    let questions = two_sum();
    tracker.toggle("Acme", "1").await.unwrap();
    tracker.toggle("Globex", "1").await.unwrap();
    tracker.sync_metadata("Acme", &questions).await.unwrap();

    let stats = tracker.stats();
    assert_eq!(stats.total_solved, 1);
    assert_eq!(stats.per_employer.len(), 2);
    assert_eq!(stats.difficulty_count(Difficulty::Easy), 1);

    let progress = tracker.progress("Acme", &questions);
    assert_eq!((progress.solved, progress.total, progress.percent), (1, 2, 50));
  }
}
