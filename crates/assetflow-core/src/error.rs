//! Error types for `assetflow-core`.

use thiserror::Error;

use crate::request::{ApprovalStatus, Transition};

#[derive(Debug, Error)]
pub enum Error {
  /// Missing, malformed, expired or mismatched session credential.
  #[error("unauthenticated")]
  Unauthenticated,

  /// The caller is authenticated but their role does not admit the operation.
  #[error("forbidden")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("validation error: {0}")]
  Validation(String),

  #[error("cannot {action} a request that is {from}")]
  InvalidTransition {
    from:   ApprovalStatus,
    action: Transition,
  },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("payment provider error: {0}")]
  Payment(String),

  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Lift a backend error into the core taxonomy.
  ///
  /// Used as `.map_err(Error::store)` on every [`AssetStore`] call.
  ///
  /// [`AssetStore`]: crate::store::AssetStore
  pub fn store<E: Into<Error>>(e: E) -> Self { e.into() }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
