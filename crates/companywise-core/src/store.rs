//! The `KeyValueStore` trait — where the solved ledger is persisted.
//!
//! The trait is implemented by storage backends (e.g.
//! `companywise-store-sqlite`). The ledger owner depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

/// Key under which the serialised [`SolvedLedger`](crate::ledger::SolvedLedger)
/// is stored.
pub const LEDGER_KEY: &str = "solved_ledger";

/// Key under which the serialised
/// [`SolvedMetadataCache`](crate::ledger::SolvedMetadataCache) is stored.
pub const METADATA_KEY: &str = "solved_metadata";

/// A byte-oriented key-value store.
///
/// Values are opaque blobs; writes replace the whole value for a key.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value stored under `key`. Returns `None` if absent.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous value.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: Vec<u8>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
