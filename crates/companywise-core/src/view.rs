//! The question view: search, difficulty filter and sort over a loaded set.

use std::cmp::Ordering;

use crate::question::{Difficulty, QuestionRecord};

// ─── Controls ────────────────────────────────────────────────────────────────

/// Which difficulties to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
  #[default]
  All,
  Only(Difficulty),
}

impl DifficultyFilter {
  /// `All → Easy → Medium → Hard → All`.
  pub fn next(self) -> Self {
    match self {
      Self::All => Self::Only(Difficulty::Easy),
      Self::Only(Difficulty::Easy) => Self::Only(Difficulty::Medium),
      Self::Only(Difficulty::Medium) => Self::Only(Difficulty::Hard),
      Self::Only(Difficulty::Hard) => Self::All,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::All => "All",
      Self::Only(d) => d.as_str(),
    }
  }

  pub fn matches(self, difficulty: Option<Difficulty>) -> bool {
    match self {
      Self::All => true,
      Self::Only(d) => difficulty == Some(d),
    }
  }
}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
  /// Most frequently asked first.
  #[default]
  Frequency,
  Title,
  /// Easiest first.
  Difficulty,
}

impl SortKey {
  pub fn next(self) -> Self {
    match self {
      Self::Frequency => Self::Difficulty,
      Self::Difficulty => Self::Title,
      Self::Title => Self::Frequency,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Frequency => "Frequency",
      Self::Title => "Title",
      Self::Difficulty => "Difficulty",
    }
  }
}

/// Live filter and sort controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewControls {
  pub search_term: String,
  pub difficulty:  DifficultyFilter,
  pub sort:        SortKey,
}

// ─── Derivation ──────────────────────────────────────────────────────────────

/// Filter and sort `questions` according to `controls`.
///
/// Pure: the output depends only on the inputs. All sorts are stable, so
/// records that compare equal keep their data-set order.
pub fn derive<'a>(
  questions: &'a [QuestionRecord],
  controls: &ViewControls,
) -> Vec<&'a QuestionRecord> {
  derive_indices(questions, controls)
    .into_iter()
    .map(|i| &questions[i])
    .collect()
}

/// Like [`derive`], but yields positions in `questions`, so callers can keep
/// the result alongside the data set it indexes.
pub fn derive_indices(
  questions: &[QuestionRecord],
  controls: &ViewControls,
) -> Vec<usize> {
  let needle = controls.search_term.to_lowercase();
  let mut out: Vec<usize> = questions
    .iter()
    .enumerate()
    .filter(|(_, q)| {
      q.title.to_lowercase().contains(&needle)
        && controls.difficulty.matches(q.difficulty)
    })
    .map(|(i, _)| i)
    .collect();

  let q = |i: &usize| &questions[*i];
  match controls.sort {
    SortKey::Frequency => out.sort_by(|a, b| {
      q(b).frequency_percent.total_cmp(&q(a).frequency_percent)
    }),
    SortKey::Title => {
      out.sort_by(|a, b| compare_titles(&q(a).title, &q(b).title))
    }
    SortKey::Difficulty => out.sort_by_key(|i| {
      q(i).difficulty.map_or(u8::MAX, Difficulty::rank)
    }),
  }
  out
}

/// Case-folded comparison, an approximation of a locale collation that
/// keeps `"apple" < "Banana" < "cherry"`. Titles equal up to case put the
/// lowercase letter first at the first difference: `"apple" < "Apple"`.
fn compare_titles(a: &str, b: &str) -> Ordering {
  let folded = a
    .chars()
    .flat_map(char::to_lowercase)
    .cmp(b.chars().flat_map(char::to_lowercase));
  let upper_last = |s: &str| {
    s.chars()
      .map(|c| (c.is_uppercase(), c))
      .collect::<Vec<_>>()
  };
  folded.then_with(|| upper_last(a).cmp(&upper_last(b)))
}
