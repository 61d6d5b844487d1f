//! Signed session tokens (HS256 JWTs) carrying the authenticated email.

use assetflow_core::Email;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
  pub user_email: String,
  pub iat:        i64,
  pub exp:        i64,
}

pub struct TokenService {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl TokenService {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      ttl,
    }
  }

  pub fn sign(&self, email: &Email) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = SessionClaims {
      user_email: email.to_string(),
      iat:        now.timestamp(),
      exp:        (now + self.ttl).timestamp(),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| ApiError::Internal(format!("failed to sign session token: {e}")))
  }

  /// Decode a token into the email it was issued for. Any failure (bad
  /// signature, expiry, malformed claims) is `Unauthenticated`.
  pub fn verify(&self, token: &str) -> Result<Email, assetflow_core::Error> {
    let data = jsonwebtoken::decode::<SessionClaims>(
      token,
      &self.decoding,
      &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
      tracing::debug!(error = %e, "session token rejected");
      assetflow_core::Error::Unauthenticated
    })?;

    Email::parse(&data.claims.user_email).map_err(|_| assetflow_core::Error::Unauthenticated)
  }
}
