//! Aggregate progress derived from the ledger and metadata cache.
//!
//! Nothing here is persisted; every figure is recomputed on demand.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{
  ledger::{SolvedLedger, SolvedMetadataCache},
  question::{Difficulty, QuestionRecord},
};

/// Cross-employer solved statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolvedStats {
  /// Distinct question ids solved under at least one employer.
  pub total_solved:   usize,
  /// Solved ids per employer; a question solved under two employers counts
  /// for both. Employers with nothing solved are absent.
  pub per_employer:   BTreeMap<String, usize>,
  /// Distinct solved ids per cached difficulty. Ids without cached metadata
  /// are not counted anywhere in this map.
  pub per_difficulty: BTreeMap<Difficulty, usize>,
}

impl SolvedStats {
  /// Up to `n` employers with the most solved questions, ties by name.
  pub fn top_employers(&self, n: usize) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = self
      .per_employer
      .iter()
      .map(|(name, count)| (name.as_str(), *count))
      .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(n);
    ranked
  }

  /// Employers with at least one solved question.
  pub fn employers_practiced(&self) -> usize { self.per_employer.len() }

  pub fn most_solved_employer(&self) -> Option<&str> {
    self.top_employers(1).first().map(|(name, _)| *name)
  }

  pub fn difficulty_count(&self, difficulty: Difficulty) -> usize {
    self.per_difficulty.get(&difficulty).copied().unwrap_or(0)
  }
}

/// Compute [`SolvedStats`] from the ledger and cache.
pub fn compute_stats(
  ledger: &SolvedLedger,
  cache: &SolvedMetadataCache,
) -> SolvedStats {
  let mut per_employer: BTreeMap<String, usize> = BTreeMap::new();
  let mut distinct: BTreeSet<&str> = BTreeSet::new();

  for (employer, id) in ledger.solved() {
    *per_employer.entry(employer.to_owned()).or_default() += 1;
    distinct.insert(id);
  }

  let mut per_difficulty: BTreeMap<Difficulty, usize> = BTreeMap::new();
  for d in distinct
    .iter()
    .filter_map(|id| cache.get(id).and_then(|meta| meta.difficulty))
  {
    *per_difficulty.entry(d).or_default() += 1;
  }

  SolvedStats { total_solved: distinct.len(), per_employer, per_difficulty }
}

/// Progress through the currently loaded data set for one employer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
  pub solved:  usize,
  pub total:   usize,
  /// Rounded percentage, `0` for an empty data set.
  pub percent: u8,
}

/// Solved share of `questions` under `employer`.
pub fn progress(
  ledger: &SolvedLedger,
  employer: &str,
  questions: &[QuestionRecord],
) -> Progress {
  let solved = questions
    .iter()
    .filter(|q| ledger.is_solved(employer, &q.id))
    .count();
  let total = questions.len();
  let percent = if total == 0 {
    0
  } else {
    ((solved as f64 / total as f64) * 100.0).round() as u8
  };
  Progress { solved, total, percent }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ledger::SolvedMeta;

  fn ledger(json: &str) -> SolvedLedger { serde_json::from_str(json).unwrap() }

  #[test]
  fn worked_example() {
    let ledger =
      ledger(r#"{"GoogleCo":{"q1":true,"q2":false},"Meta":{"q1":true}}"#);
    let cache: SolvedMetadataCache = serde_json::from_str(
      r#"{"q1":{"title":"Two Sum","difficulty":"Medium"}}"#,
    )
    .unwrap();

    let stats = compute_stats(&ledger, &cache);
    assert_eq!(stats.total_solved, 1);
    assert_eq!(stats.per_employer.get("GoogleCo"), Some(&1));
    assert_eq!(stats.per_employer.get("Meta"), Some(&1));
    assert_eq!(stats.difficulty_count(Difficulty::Medium), 1);
    assert_eq!(stats.per_difficulty.len(), 1);
    assert_eq!(stats.employers_practiced(), 2);
  }

  #[test]
  fn employer_counts_bound_the_distinct_total() {
    let ledger = ledger(
      r#"{"A":{"1":true,"2":true},"B":{"2":true,"3":true},"C":{"4":false}}"#,
    );
    let stats = compute_stats(&ledger, &SolvedMetadataCache::new());
    assert_eq!(stats.total_solved, 3);
    assert_eq!(stats.per_employer.values().sum::<usize>(), 4);
    assert!(!stats.per_employer.contains_key("C"));
    assert_eq!(stats.employers_practiced(), 2);
    assert!(stats.per_difficulty.is_empty());
  }

  #[test]
  fn unsolved_cache_entries_are_not_counted() {
    let ledger = ledger(r#"{"A":{"1":false}}"#);
    let mut cache = SolvedMetadataCache::new();
    cache.sync(
      "A",
      &[QuestionRecord::new("1", "x", Some(Difficulty::Hard))],
      &serde_json::from_str(r#"{"A":{"1":true}}"#).unwrap(),
    );
    assert_eq!(
      cache.get("1"),
      Some(&SolvedMeta { title: "x".into(), difficulty: Some(Difficulty::Hard) })
    );
    let stats = compute_stats(&ledger, &cache);
    assert_eq!(stats.total_solved, 0);
    assert_eq!(stats.difficulty_count(Difficulty::Hard), 0);
  }

  #[test]
  fn top_employers_rank_by_count_then_name() {
    let ledger = ledger(
      r#"{"Beta":{"1":true},"Alpha":{"1":true},"Gamma":{"1":true,"2":true}}"#,
    );
    let stats = compute_stats(&ledger, &SolvedMetadataCache::new());
    assert_eq!(
      stats.top_employers(2),
      vec![("Gamma", 2), ("Alpha", 1)]
    );
    assert_eq!(stats.most_solved_employer(), Some("Gamma"));
    assert_eq!(SolvedStats::default().most_solved_employer(), None);
  }

  #[test]
  fn progress_rounds_and_handles_empty_sets() {
    let ledger = ledger(r#"{"A":{"1":true}}"#);
    let questions = vec![
      QuestionRecord::new("1", "a", None),
      QuestionRecord::new("2", "b", None),
      QuestionRecord::new("3", "c", None),
    ];
    assert_eq!(
      progress(&ledger, "A", &questions),
      Progress { solved: 1, total: 3, percent: 33 }
    );
    assert_eq!(progress(&ledger, "A", &[]), Progress::default());
  }
}
