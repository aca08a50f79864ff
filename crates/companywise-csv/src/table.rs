//! Header-plus-rows view of a CSV document.
//!
//! Pipeline:
//!   raw &str
//!     └─ strip BOM
//!          └─ csv::Reader (flexible)  → header StringRecord + rows
//!               └─ Table::column()  → header position by exact name

use csv::{ReaderBuilder, StringRecord};

use crate::error::Result;

/// A header row plus data rows.
///
/// Rows may be shorter or longer than the header; a missing trailing field
/// reads as absent through [`StringRecord::get`].
#[derive(Debug, Clone, Default)]
pub struct Table {
  pub headers: StringRecord,
  pub rows:    Vec<StringRecord>,
}

impl Table {
  /// Read `input` as RFC 4180 CSV with a header row.
  ///
  /// Quoted fields may hold commas, `""` escapes and line breaks; CRLF and
  /// LF both end a record; blank lines are skipped.
  pub fn read(input: &str) -> Result<Self> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = ReaderBuilder::new()
      .has_headers(true)
      .flexible(true)
      .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    let rows = reader.records().collect::<Result<Vec<_>, csv::Error>>()?;
    Ok(Self { headers, rows })
  }

  /// Index of the column named exactly `name`, if present.
  pub fn column(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h == name)
  }
}
