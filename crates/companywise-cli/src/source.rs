//! Where published question data is read from: an HTTP site or a local
//! directory with the same layout.
//!
//! ```text
//! {root}/companies.json
//! {root}/data/{employer}/{period}.csv
//! ```

use std::{io, path::PathBuf, time::Duration};

use companywise_core::{period::PeriodId, source::QuestionSource};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

pub const MANIFEST_FILE: &str = "companies.json";
pub const DATA_DIR: &str = "data";

#[derive(Debug, Error)]
pub enum SourceError {
  #[error("invalid source URL {0:?}")]
  InvalidUrl(String),

  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("GET {url} → {status}")]
  Status { url: String, status: StatusCode },

  #[error("reading {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}

// ─── HTTP ─────────────────────────────────────────────────────────────────────

/// Async HTTP reader for a published site.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpSource {
  client: Client,
  base:   Url,
}

impl HttpSource {
  pub fn new(base_url: &str) -> Result<Self, SourceError> {
    // A trailing slash makes `base` a directory for segment pushes.
    let mut base = Url::parse(base_url)
      .map_err(|_| SourceError::InvalidUrl(base_url.to_owned()))?;
    if base.cannot_be_a_base() {
      return Err(SourceError::InvalidUrl(base_url.to_owned()));
    }
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, base })
  }

  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  async fn get_text(&self, url: Url) -> Result<Option<String>, SourceError> {
    let resp = self.client.get(url.clone()).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(SourceError::Status {
        url:    url.to_string(),
        status: resp.status(),
      });
    }
    Ok(Some(resp.text().await?))
  }

  /// `GET {base}/companies.json`
  pub async fn fetch_manifest(&self) -> Result<String, SourceError> {
    let url = self.url(&[MANIFEST_FILE]);
    self.get_text(url.clone()).await?.ok_or(SourceError::Status {
      url:    url.to_string(),
      status: StatusCode::NOT_FOUND,
    })
  }

  /// `GET {base}/data/{employer}/{period}.csv`
  pub async fn fetch_dataset(
    &self,
    employer: &str,
    period: PeriodId,
  ) -> Result<Option<String>, SourceError> {
    let url = self.url(&[DATA_DIR, employer, &period.file_name()]);
    self.get_text(url).await
  }
}

// ─── Local directory ──────────────────────────────────────────────────────────

/// Reads the same layout from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
  root: PathBuf,
}

impl DirSource {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  async fn read(&self, path: PathBuf) -> Result<Option<String>, SourceError> {
    match tokio::fs::read_to_string(&path).await {
      Ok(text) => Ok(Some(text)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(source) => Err(SourceError::Io { path, source }),
    }
  }

  pub async fn fetch_manifest(&self) -> Result<String, SourceError> {
    let path = self.root.join(MANIFEST_FILE);
    match tokio::fs::read_to_string(&path).await {
      Ok(text) => Ok(text),
      Err(source) => Err(SourceError::Io { path, source }),
    }
  }

  pub async fn fetch_dataset(
    &self,
    employer: &str,
    period: PeriodId,
  ) -> Result<Option<String>, SourceError> {
    // Employer names come from the manifest; refuse anything that would
    // step outside the data directory.
    if employer.is_empty()
      || employer.contains(['/', '\\'])
      || employer == ".."
    {
      return Ok(None);
    }
    let path = self
      .root
      .join(DATA_DIR)
      .join(employer)
      .join(period.file_name());
    self.read(path).await
  }
}

// ─── Source ───────────────────────────────────────────────────────────────────

/// The configured source, chosen from the `--source` location.
#[derive(Clone)]
pub enum Source {
  Http(HttpSource),
  Dir(DirSource),
}

impl Source {
  /// `http://` and `https://` locations are fetched over HTTP; anything else
  /// is a local directory.
  pub fn from_location(location: &str) -> Result<Self, SourceError> {
    if location.starts_with("http://") || location.starts_with("https://") {
      Ok(Self::Http(HttpSource::new(location)?))
    } else {
      Ok(Self::Dir(DirSource::new(location)))
    }
  }

  pub fn describe(&self) -> String {
    match self {
      Self::Http(h) => h.base.to_string(),
      Self::Dir(d) => d.root.display().to_string(),
    }
  }
}

impl QuestionSource for Source {
  type Error = SourceError;

  async fn fetch_manifest(&self) -> Result<String, SourceError> {
    match self {
      Self::Http(h) => h.fetch_manifest().await,
      Self::Dir(d) => d.fetch_manifest().await,
    }
  }

  async fn fetch_dataset(
    &self,
    employer: &str,
    period: PeriodId,
  ) -> Result<Option<String>, SourceError> {
    match self {
      Self::Http(h) => h.fetch_dataset(employer, period).await,
      Self::Dir(d) => d.fetch_dataset(employer, period).await,
    }
  }
}
