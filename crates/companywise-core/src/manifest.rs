//! The employer manifest (`companies.json`).
//!
//! Two document shapes exist in the wild:
//!
//! ```json
//! ["Acme", "Globex"]
//! ```
//!
//! ```json
//! {
//!   "lastUpdated": "2024-05-01",
//!   "companies": ["Acme", { "name": "Globex", "files": ["all.csv"] }]
//! }
//! ```
//!
//! Both are normalised once, here, into [`Manifest`]; nothing downstream
//! branches on the raw shape.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Result, period::PeriodId};

// ─── Canonical shape ─────────────────────────────────────────────────────────

/// An employer whose interview questions are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employer {
  pub name:              String,
  /// Periods with a data set. Empty means "unknown", i.e. all periods.
  pub available_periods: BTreeSet<PeriodId>,
}

impl Employer {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), available_periods: BTreeSet::new() }
  }

  pub fn with_periods(
    name: impl Into<String>,
    periods: impl IntoIterator<Item = PeriodId>,
  ) -> Self {
    Self {
      name:              name.into(),
      available_periods: periods.into_iter().collect(),
    }
  }
}

/// The normalised manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
  pub employers:    Vec<Employer>,
  pub last_updated: Option<NaiveDate>,
}

// ─── Raw wire shapes ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum RawEntry {
  Name(String),
  Detailed {
    name:  String,
    #[serde(default)]
    files: Vec<String>,
  },
}

#[derive(Debug, Deserialize, Serialize)]
struct RawDocument {
  #[serde(alias = "employers")]
  companies:    Vec<RawEntry>,
  #[serde(
    default,
    rename = "lastUpdated",
    skip_serializing_if = "Option::is_none"
  )]
  last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawManifest {
  List(Vec<RawEntry>),
  Document(RawDocument),
}

impl From<RawEntry> for Employer {
  fn from(raw: RawEntry) -> Self {
    match raw {
      RawEntry::Name(name) => Employer::new(name),
      RawEntry::Detailed { name, files } => {
        let periods = files
          .iter()
          .filter_map(|f| match PeriodId::from_file_name(f) {
            Ok(p) => Some(p),
            Err(e) => {
              tracing::debug!(employer = %name, file = %f, "ignoring manifest file: {e}");
              None
            }
          })
          .collect();
        Employer { name, available_periods: periods }
      }
    }
  }
}

impl Manifest {
  /// Parse and normalise a manifest document.
  pub fn from_json(input: &str) -> Result<Self> {
    let raw: RawManifest = serde_json::from_str(input)?;
    let (entries, last_updated) = match raw {
      RawManifest::List(entries) => (entries, None),
      RawManifest::Document(doc) => (doc.companies, doc.last_updated),
    };

    let last_updated = last_updated.and_then(|s| {
      NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .inspect_err(|e| tracing::debug!("ignoring lastUpdated {s:?}: {e}"))
        .ok()
    });

    Ok(Self {
      employers: entries.into_iter().map(Employer::from).collect(),
      last_updated,
    })
  }

  /// Serialise to the object document shape, listing every employer with
  /// its period files.
  pub fn to_json(&self) -> Result<String> {
    let doc = RawDocument {
      companies:    self
        .employers
        .iter()
        .map(|e| RawEntry::Detailed {
          name:  e.name.clone(),
          files: e.available_periods.iter().map(|p| p.file_name()).collect(),
        })
        .collect(),
      last_updated: self
        .last_updated
        .map(|d| d.format("%Y-%m-%d").to_string()),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
  }

  pub fn employer(&self, name: &str) -> Option<&Employer> {
    self.employers.iter().find(|e| e.name == name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn legacy_list_implies_all_periods() {
    let m = Manifest::from_json(r#"["Acme", "Globex"]"#).unwrap();
    assert_eq!(m.employers.len(), 2);
    assert!(m.employers.iter().all(|e| e.available_periods.is_empty()));
    assert_eq!(m.last_updated, None);
  }

  #[test]
  fn document_shape_mixes_entry_kinds() {
    let m = Manifest::from_json(
      r#"{
        "lastUpdated": "2024-05-01",
        "companies": [
          "Acme",
          { "name": "Globex", "files": ["all.csv", "three-months.csv", "notes.txt"] }
        ]
      }"#,
    )
    .unwrap();

    assert_eq!(m.last_updated, NaiveDate::from_ymd_opt(2024, 5, 1));
    assert_eq!(m.employers[0], Employer::new("Acme"));
    let globex = m.employer("Globex").unwrap();
    assert_eq!(
      globex.available_periods,
      [PeriodId::ThreeMonths, PeriodId::All].into_iter().collect()
    );
  }

  #[test]
  fn bad_last_updated_is_dropped() {
    let m = Manifest::from_json(
      r#"{ "employers": ["Acme"], "lastUpdated": "yesterday" }"#,
    )
    .unwrap();
    assert_eq!(m.employers.len(), 1);
    assert_eq!(m.last_updated, None);
  }

  #[test]
  fn malformed_document_is_an_error() {
    assert!(Manifest::from_json("{ not json").is_err());
    assert!(Manifest::from_json(r#"{ "lastUpdated": "2024-01-01" }"#).is_err());
  }

  #[test]
  fn written_manifest_reads_back() {
    let m = Manifest {
      employers:    vec![
        Employer::with_periods("Acme", [PeriodId::All, PeriodId::ThirtyDays]),
        Employer::with_periods("Globex", [PeriodId::SixMonths]),
      ],
      last_updated: NaiveDate::from_ymd_opt(2025, 1, 31),
    };
    let json = m.to_json().unwrap();
    assert!(json.contains("\"lastUpdated\": \"2025-01-31\""));
    assert_eq!(Manifest::from_json(&json).unwrap(), m);
  }
}
