//! The `QuestionSource` trait — where manifests and data sets come from.
//!
//! Implemented by the client for HTTP and local-directory layouts:
//!
//! ```text
//! companies.json
//! data/{employer}/{period}.csv
//! ```

use std::future::Future;

use crate::period::PeriodId;

/// Read-only access to published question data.
pub trait QuestionSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the raw manifest document.
  fn fetch_manifest(
    &self,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Fetch the raw CSV for `(employer, period)`.
  ///
  /// A missing data set is `Ok(None)`, not an error.
  fn fetch_dataset<'a>(
    &'a self,
    employer: &'a str,
    period: PeriodId,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}
