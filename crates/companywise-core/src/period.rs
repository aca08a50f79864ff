//! Data periods and the resolver that picks which one to display.
//!
//! Each employer publishes one CSV per period. Not every employer has every
//! period, so whenever the selected employer changes the current period is
//! re-checked against what that employer actually offers.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A time window over which question frequency was measured.
///
/// Variants are declared in fallback preference order, so the derived `Ord`
/// matches [`PeriodId::PREFERENCE`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodId {
  ThirtyDays,
  ThreeMonths,
  SixMonths,
  MoreThanSixMonths,
  All,
}

impl PeriodId {
  /// Fallback order used when the current period is not available.
  pub const PREFERENCE: [PeriodId; 5] = [
    PeriodId::ThirtyDays,
    PeriodId::ThreeMonths,
    PeriodId::SixMonths,
    PeriodId::MoreThanSixMonths,
    PeriodId::All,
  ];

  /// File stem of the period's data set, e.g. `thirty-days` for
  /// `thirty-days.csv`.
  pub fn stem(self) -> &'static str {
    match self {
      Self::ThirtyDays => "thirty-days",
      Self::ThreeMonths => "three-months",
      Self::SixMonths => "six-months",
      Self::MoreThanSixMonths => "more-than-six-months",
      Self::All => "all",
    }
  }

  pub fn file_name(self) -> String { format!("{}.csv", self.stem()) }

  /// Short human-readable label.
  pub fn label(self) -> &'static str {
    match self {
      Self::ThirtyDays => "30 Days",
      Self::ThreeMonths => "3 Months",
      Self::SixMonths => "6 Months",
      Self::MoreThanSixMonths => "> 6 Months",
      Self::All => "All Time",
    }
  }

  /// Parse a manifest file entry such as `three-months.csv`.
  pub fn from_file_name(name: &str) -> Result<Self, Error> {
    name.strip_suffix(".csv").unwrap_or(name).parse()
  }
}

impl fmt::Display for PeriodId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.stem())
  }
}

impl FromStr for PeriodId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::PREFERENCE
      .into_iter()
      .find(|p| p.stem() == s)
      .ok_or_else(|| Error::UnknownPeriod(s.to_owned()))
  }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Decide which period to display for an employer.
///
/// - An empty `available` set means the manifest carried no availability
///   metadata; every period is treated as available and `current` is kept.
/// - A `current` period that is still available is never reselected.
/// - Otherwise the first available period in [`PeriodId::PREFERENCE`] wins.
pub fn resolve(available: &BTreeSet<PeriodId>, current: PeriodId) -> PeriodId {
  if available.is_empty() || available.contains(&current) {
    return current;
  }
  PeriodId::PREFERENCE
    .into_iter()
    .find(|p| available.contains(p))
    .or_else(|| available.iter().next().copied())
    .unwrap_or(current)
}

/// The periods a user may pick for an employer, in preference order.
pub fn selectable(available: &BTreeSet<PeriodId>) -> Vec<PeriodId> {
  PeriodId::PREFERENCE
    .into_iter()
    .filter(|p| available.is_empty() || available.contains(p))
    .collect()
}

/// Step to the next (or previous) selectable period, wrapping around.
///
/// If `current` is not selectable the first selectable period is returned.
pub fn cycle(
  available: &BTreeSet<PeriodId>,
  current: PeriodId,
  forward: bool,
) -> PeriodId {
  let options = selectable(available);
  let Some(pos) = options.iter().position(|p| *p == current) else {
    return options.first().copied().unwrap_or(current);
  };
  let len = options.len();
  let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
  options[next]
}
