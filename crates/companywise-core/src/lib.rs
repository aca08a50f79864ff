//! Core types and derivations for companywise.
//!
//! This crate is deliberately free of HTTP, terminal and database
//! dependencies. It owns the data model, the pure derivations over it
//! (period resolution, the filtered question view, aggregate statistics) and
//! the solved ledger with its persistence contract.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod ledger;
pub mod manifest;
pub mod period;
pub mod question;
pub mod source;
pub mod stats;
pub mod store;
pub mod tracker;
pub mod view;

pub use error::{Error, Result};
