//! API error type and [`axum::response::IntoResponse`] implementation.

use assetflow_core::Error as CoreError;
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Core(e) => match e {
        CoreError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CoreError::Forbidden => StatusCode::FORBIDDEN,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::InvalidTransition { .. } | CoreError::Conflict(_) => StatusCode::CONFLICT,
        CoreError::Payment(_) => StatusCode::BAD_GATEWAY,
        CoreError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Core(CoreError::StoreUnavailable(source)) => {
        tracing::error!(error = %source, "store unavailable");
        "store unavailable".to_owned()
      }
      ApiError::Core(CoreError::Serialization(source)) => {
        tracing::error!(error = %source, "stored document could not be decoded");
        "internal error".to_owned()
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        "internal error".to_owned()
      }
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assetflow_core::request::{ApprovalStatus, Transition};

  #[test]
  fn taxonomy_maps_to_status_codes() {
    let cases = [
      (CoreError::Unauthenticated, StatusCode::UNAUTHORIZED),
      (CoreError::Forbidden, StatusCode::FORBIDDEN),
      (CoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
      (CoreError::Validation("x".into()), StatusCode::BAD_REQUEST),
      (
        CoreError::InvalidTransition {
          from:   ApprovalStatus::Pending,
          action: Transition::Return,
        },
        StatusCode::CONFLICT,
      ),
      (CoreError::Conflict("x".into()), StatusCode::CONFLICT),
      (CoreError::Payment("x".into()), StatusCode::BAD_GATEWAY),
      (
        CoreError::StoreUnavailable("disk gone".into()),
        StatusCode::SERVICE_UNAVAILABLE,
      ),
    ];
    for (error, status) in cases {
      assert_eq!(ApiError::from(error).into_response().status(), status);
    }
  }
}
