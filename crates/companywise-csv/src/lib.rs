//! CSV codec for companywise question data sets.
//!
//! Converts the per-employer, per-period CSV files into
//! [`companywise_core::question::QuestionRecord`]s. Pure synchronous; no
//! HTTP or file-system dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let csv = "ID,Title,Difficulty,Frequency %\n1,Two Sum,Easy,100.0%\n";
//! let records = companywise_csv::parse(csv).unwrap();
//! assert_eq!(records[0].title, "Two Sum");
//! ```

pub mod error;
mod table;

use companywise_core::question::{QuestionRecord, parse_percent};

pub use error::{Error, Result};
pub use table::Table;

// ─── Recognised columns ──────────────────────────────────────────────────────

pub const COL_ID: &str = "ID";
pub const COL_TITLE: &str = "Title";
pub const COL_URL: &str = "URL";
pub const COL_DIFFICULTY: &str = "Difficulty";
pub const COL_ACCEPTANCE: &str = "Acceptance %";
pub const COL_FREQUENCY: &str = "Frequency %";

// ─── Public API ──────────────────────────────────────────────────────────────

/// Split `input` into a header row and data rows.
pub fn parse_table(input: &str) -> Result<Table> { Table::read(input) }

/// Parse a question data set.
///
/// Every data row yields a record, even when fields are missing or
/// malformed: absent text columns become empty strings, an unrecognised
/// difficulty becomes `None`, and unparseable percentages become `0.0`.
/// Header names are matched exactly; unknown columns are ignored.
pub fn parse(input: &str) -> Result<Vec<QuestionRecord>> {
  let table = parse_table(input)?;

  let id = table.column(COL_ID);
  let title = table.column(COL_TITLE);
  let url = table.column(COL_URL);
  let difficulty = table.column(COL_DIFFICULTY);
  let acceptance = table.column(COL_ACCEPTANCE);
  let frequency = table.column(COL_FREQUENCY);

  let records = table
    .rows
    .iter()
    .map(|row| {
      let cell = |col: Option<usize>| {
        col.and_then(|i| row.get(i)).unwrap_or("")
      };
      QuestionRecord {
        id:                 cell(id).to_owned(),
        title:              cell(title).to_owned(),
        url:                cell(url).to_owned(),
        difficulty:         cell(difficulty).parse().ok(),
        acceptance_percent: parse_percent(cell(acceptance)),
        frequency_percent:  parse_percent(cell(frequency)),
      }
    })
    .collect();
  Ok(records)
}

#[cfg(test)]
mod tests {
  use companywise_core::question::Difficulty;

  use super::*;

  const SAMPLE: &str = "\
ID,URL,Title,Difficulty,Acceptance %,Frequency %
1,https://leetcode.com/problems/two-sum,Two Sum,Easy,55.8%,100.0%
146,https://leetcode.com/problems/lru-cache,LRU Cache,Medium,44.0%,87.5%
";

  #[test]
  fn parses_recognised_columns_in_any_order() {
    let records = parse(SAMPLE).unwrap();
    assert_eq!(records.len(), 2);

    let lru = &records[1];
    assert_eq!(lru.id, "146");
    assert_eq!(lru.title, "LRU Cache");
    assert_eq!(lru.url, "https://leetcode.com/problems/lru-cache");
    assert_eq!(lru.difficulty, Some(Difficulty::Medium));
    assert_eq!(lru.acceptance_percent, 44.0);
    assert_eq!(lru.frequency_percent, 87.5);
  }

  #[test]
  fn unknown_columns_are_ignored_and_missing_ones_default() {
    let records =
      parse("Title,Topics,ID\n\"Merge Intervals\",\"Array, Sorting\",56\n")
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "56");
    assert_eq!(records[0].title, "Merge Intervals");
    assert_eq!(records[0].url, "");
    assert_eq!(records[0].difficulty, None);
    assert_eq!(records[0].frequency_percent, 0.0);
  }

  #[test]
  fn malformed_rows_are_kept_as_partial_records() {
    let records = parse(
      "ID,Title,Difficulty,Frequency %\n\
       1,Two Sum,Easy,abc\n\
       2\n\
       3,Median,Impossible,12%\n",
    )
    .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].frequency_percent, 0.0);
    assert_eq!(records[1].id, "2");
    assert_eq!(records[1].title, "");
    assert_eq!(records[2].difficulty, None);
    assert_eq!(records[2].frequency_percent, 12.0);
  }

  #[test]
  fn header_names_are_case_sensitive() {
    let records = parse("id,title\n1,Two Sum\n").unwrap();
    assert_eq!(records[0].id, "");
    assert_eq!(records[0].title, "");
  }

  #[test]
  fn empty_and_header_only_inputs_have_no_records() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("ID,Title\n").unwrap().is_empty());
  }

  #[test]
  fn unterminated_quote_runs_to_end_of_input() {
    let records = parse("ID,Title\n1,\"Two Sum\n2,LRU Cache\n").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "1");
    assert!(records[0].title.starts_with("Two Sum\n2,LRU Cache"));
  }
}
