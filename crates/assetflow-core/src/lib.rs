//! Core types and trait definitions for the AssetFlow asset-management
//! service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! access-control layer, the request workflow and the roster manager are all
//! written against the [`store::AssetStore`] trait; backends and transports
//! live in their own crates.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod accounts;
pub mod asset;
pub mod email;
pub mod error;
pub mod inventory;
pub mod payment;
pub mod request;
pub mod roster;
pub mod scope;
pub mod store;
pub mod user;
pub mod workflow;

pub use email::Email;
pub use error::{Error, Result};

use uuid::Uuid;

/// Parse a caller-supplied record identifier.
///
/// Fails with [`Error::Validation`] before any store call is made.
pub fn parse_id(raw: &str) -> Result<Uuid> {
  Uuid::parse_str(raw.trim())
    .map_err(|_| Error::Validation(format!("malformed identifier: {raw:?}")))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_id_accepts_hyphenated_uuid() {
    let id = Uuid::new_v4();
    assert_eq!(parse_id(&id.to_string()).unwrap(), id);
  }

  #[test]
  fn parse_id_rejects_garbage() {
    assert!(matches!(parse_id("65f1c0ffee"), Err(Error::Validation(_))));
  }
}
