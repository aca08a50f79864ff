//! Error types for the companywise-csv parser.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("reading CSV: {0}")]
  Csv(#[from] csv::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
