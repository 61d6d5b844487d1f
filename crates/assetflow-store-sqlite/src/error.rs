//! Error type for `assetflow-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rejection (not found, conflict, invalid transition).
  #[error(transparent)]
  Core(#[from] assetflow_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column held a value this build cannot decode.
  #[error("decode error: {0}")]
  Decode(String),
}

impl From<Error> for assetflow_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => assetflow_core::Error::StoreUnavailable(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
