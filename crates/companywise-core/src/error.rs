//! Error types for `companywise-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown period identifier: {0:?}")]
  UnknownPeriod(String),

  #[error("unknown difficulty: {0:?}")]
  UnknownDifficulty(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
