//! Question records — one row of a per-employer, per-period data set.
//!
//! Records are sourced fresh from the data set on every employer or period
//! change and are never persisted. Parsing is best-effort: a malformed row
//! still yields a record, with unknown fields left empty or zeroed.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

// ─── Difficulty ──────────────────────────────────────────────────────────────

/// How hard a question is rated upstream.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] =
    [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  /// Severity rank used for sorting: `Easy(1) < Medium(2) < Hard(3)`.
  pub fn rank(self) -> u8 {
    match self {
      Self::Easy => 1,
      Self::Medium => 2,
      Self::Hard => 3,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Easy => "Easy",
      Self::Medium => "Medium",
      Self::Hard => "Hard",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Difficulty {
  type Err = Error;

  /// Exact, case-sensitive match on the upstream spelling.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Easy" => Ok(Self::Easy),
      "Medium" => Ok(Self::Medium),
      "Hard" => Ok(Self::Hard),
      other => Err(Error::UnknownDifficulty(other.to_owned())),
    }
  }
}

// ─── QuestionRecord ──────────────────────────────────────────────────────────

/// A single interview question as listed for one employer and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
  /// Upstream question id; unique within one data set, reused as the ledger
  /// key across employers.
  pub id:                 String,
  pub title:              String,
  pub url:                String,
  /// `None` when the row carried no recognisable difficulty.
  pub difficulty:         Option<Difficulty>,
  pub acceptance_percent: f64,
  pub frequency_percent:  f64,
}

impl QuestionRecord {
  /// Convenience constructor with zeroed percentages and an empty URL.
  pub fn new(
    id: impl Into<String>,
    title: impl Into<String>,
    difficulty: Option<Difficulty>,
  ) -> Self {
    Self {
      id: id.into(),
      title: title.into(),
      url: String::new(),
      difficulty,
      acceptance_percent: 0.0,
      frequency_percent: 0.0,
    }
  }
}

/// Parse a percentage cell such as `"45.2%"`, `" 100 "` or `"12.5"`.
///
/// Reads the longest leading numeric prefix, so trailing units are ignored.
/// Anything unparseable (empty, `"N/A"`, `NaN`, infinities) yields `0.0`.
pub fn parse_percent(raw: &str) -> f64 {
  let s = raw.trim();
  let end = s
    .char_indices()
    .take_while(|&(i, c)| {
      c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)
    })
    .map(|(i, c)| i + c.len_utf8())
    .last()
    .unwrap_or(0);

  match s[..end].parse::<f64>() {
    Ok(v) if v.is_finite() => v,
    _ => 0.0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn difficulty_parses_exact_spelling_only() {
    assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
    assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    assert!("easy".parse::<Difficulty>().is_err());
    assert!("".parse::<Difficulty>().is_err());
  }

  #[test]
  fn difficulty_rank_orders_by_severity() {
    assert!(Difficulty::Easy.rank() < Difficulty::Medium.rank());
    assert!(Difficulty::Medium.rank() < Difficulty::Hard.rank());
  }

  #[test]
  fn percent_parsing_is_lenient() {
    assert_eq!(parse_percent("45.2%"), 45.2);
    assert_eq!(parse_percent(" 100 "), 100.0);
    assert_eq!(parse_percent("12.5"), 12.5);
    assert_eq!(parse_percent(""), 0.0);
    assert_eq!(parse_percent("N/A"), 0.0);
    assert_eq!(parse_percent("%"), 0.0);
  }
}
