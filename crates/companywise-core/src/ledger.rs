//! The solved ledger and its metadata cache.
//!
//! The ledger records, per employer, which question ids the user has marked
//! solved. Toggling a question off keeps its key with a `false` value, so the
//! key count only grows.
//!
//! The metadata cache remembers the title and difficulty of every question
//! ever seen solved while its full record was loaded. It backs aggregate
//! statistics across employers whose data sets are not in memory, and is
//! never pruned: un-solving a question leaves its entry in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::question::{Difficulty, QuestionRecord};

// ─── SolvedLedger ────────────────────────────────────────────────────────────

/// `employer → question id → solved`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolvedLedger(BTreeMap<String, BTreeMap<String, bool>>);

impl SolvedLedger {
  pub fn new() -> Self { Self::default() }

  /// Flip the solved flag for `(employer, id)` and return the new value.
  /// An absent entry counts as unsolved, so the first toggle marks it solved.
  pub fn toggle(&mut self, employer: &str, id: &str) -> bool {
    let flag = self
      .0
      .entry(employer.to_owned())
      .or_default()
      .entry(id.to_owned())
      .or_insert(false);
    *flag = !*flag;
    *flag
  }

  pub fn is_solved(&self, employer: &str, id: &str) -> bool {
    self
      .0
      .get(employer)
      .and_then(|m| m.get(id))
      .copied()
      .unwrap_or(false)
  }

  /// Iterate `(employer, question id)` pairs currently marked solved.
  pub fn solved(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
    self.0.iter().flat_map(|(employer, questions)| {
      questions
        .iter()
        .filter(|&(_, solved)| *solved)
        .map(move |(id, _)| (employer.as_str(), id.as_str()))
    })
  }
}

// ─── SolvedMetadataCache ─────────────────────────────────────────────────────

/// What is remembered about a solved question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedMeta {
  pub title:      String,
  pub difficulty: Option<Difficulty>,
}

/// `question id → metadata`, first-seen wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolvedMetadataCache(BTreeMap<String, SolvedMeta>);

impl SolvedMetadataCache {
  pub fn new() -> Self { Self::default() }

  pub fn get(&self, id: &str) -> Option<&SolvedMeta> { self.0.get(id) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Record metadata for every question in `questions` that is solved under
  /// `employer` and not yet cached. Existing entries are never overwritten.
  ///
  /// Returns the number of entries added.
  pub fn sync(
    &mut self,
    employer: &str,
    questions: &[QuestionRecord],
    ledger: &SolvedLedger,
  ) -> usize {
    let additions = self.missing(employer, questions, ledger);
    let added = additions.len();
    self.0.extend(additions);
    added
  }

  /// The entries [`sync`](Self::sync) would add, without adding them.
  /// Within `questions` the first record for an id wins.
  pub fn missing(
    &self,
    employer: &str,
    questions: &[QuestionRecord],
    ledger: &SolvedLedger,
  ) -> BTreeMap<String, SolvedMeta> {
    let mut additions = BTreeMap::new();
    for q in questions {
      if !ledger.is_solved(employer, &q.id) || self.0.contains_key(&q.id) {
        continue;
      }
      additions.entry(q.id.clone()).or_insert_with(|| SolvedMeta {
        title:      q.title.clone(),
        difficulty: q.difficulty,
      });
    }
    additions
  }

  /// Add entries returned by [`missing`](Self::missing).
  pub(crate) fn insert_all(&mut self, additions: BTreeMap<String, SolvedMeta>) {
    self.0.extend(additions);
  }

  /// Drop entries by id. Only used to undo an unpersisted
  /// [`insert_all`](Self::insert_all).
  pub(crate) fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
    for id in ids {
      self.0.remove(id);
    }
  }
}
