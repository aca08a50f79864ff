//! `companywise index` — build `companies.json` from a data directory.
//!
//! ```text
//! {data-dir}/{employer}/{period}.csv  →  companies.json
//! ```

use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use companywise_core::{
  manifest::{Employer, Manifest},
  period::PeriodId,
};

/// Scan `data_dir` and describe every employer with at least one known
/// period file. Employers are sorted by name.
pub fn build_manifest(data_dir: &Path, today: NaiveDate) -> Result<Manifest> {
  let entries = fs::read_dir(data_dir)
    .with_context(|| format!("reading data directory {}", data_dir.display()))?;

  let mut employers = Vec::new();
  for entry in entries {
    let entry = entry.context("listing data directory")?;
    if !entry.file_type()?.is_dir() {
      continue;
    }
    let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
      tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 directory");
      continue;
    };

    let periods = periods_in(&entry.path())?;
    if periods.is_empty() {
      tracing::debug!(employer = %name, "no period files, skipping");
      continue;
    }
    employers.push(Employer::with_periods(name, periods));
  }
  employers.sort_by(|a, b| a.name.cmp(&b.name));

  Ok(Manifest { employers, last_updated: Some(today) })
}

fn periods_in(dir: &Path) -> Result<Vec<PeriodId>> {
  let mut periods = Vec::new();
  for entry in
    fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?
  {
    let file_name = entry?.file_name();
    let Some(file_name) = file_name.to_str() else { continue };
    if !file_name.ends_with(".csv") {
      continue;
    }
    match PeriodId::from_file_name(file_name) {
      Ok(period) => periods.push(period),
      Err(e) => tracing::debug!(dir = %dir.display(), "ignoring {file_name}: {e}"),
    }
  }
  Ok(periods)
}

/// Build the manifest and write it to `out` (default
/// `{data_dir}/../companies.json`). Returns the path written.
pub fn run(
  data_dir: &Path,
  out: Option<PathBuf>,
  today: NaiveDate,
) -> Result<PathBuf> {
  let manifest = build_manifest(data_dir, today)?;
  let out = out.unwrap_or_else(|| {
    data_dir
      .parent()
      .unwrap_or(Path::new("."))
      .join(crate::source::MANIFEST_FILE)
  });

  let json = manifest.to_json().context("serialising manifest")?;
  fs::write(&out, json).with_context(|| format!("writing {}", out.display()))?;
  tracing::info!(employers = manifest.employers.len(), out = %out.display(), "wrote manifest");
  Ok(out)
}
