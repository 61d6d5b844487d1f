//! Session-cookie extractor and the per-operation authorization helper.
//!
//! Extraction only proves the token is genuine. The self-consistency and
//! role gates run in [`Session::authorize`], once the handler knows which
//! operation it serves and which email the caller declared.

use assetflow_core::{
  Email,
  access::{Caller, Operation},
  store::AssetStore,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{AppState, ServerConfig, error::ApiError};

/// Name of the HTTP-only cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// A request carrying a verified session token.
#[derive(Debug, Clone)]
pub struct Session {
  pub email: Email,
}

impl Session {
  /// Check `declared` against the session and the caller's role against
  /// `op`, yielding the caller's full record.
  pub async fn authorize<S: AssetStore>(
    &self,
    state: &AppState<S>,
    op: Operation,
    declared: &str,
  ) -> Result<Caller, ApiError> {
    Ok(
      state
        .policy
        .authorize(state.store.as_ref(), op, &self.email, declared)
        .await?,
    )
  }
}

impl<S> FromRequestParts<AppState<S>> for Session
where
  S: AssetStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
      .get(TOKEN_COOKIE)
      .map(|c| c.value().to_owned())
      .ok_or(assetflow_core::Error::Unauthenticated)?;

    let email = state.tokens.verify(&token)?;
    Ok(Session { email })
  }
}

/// The cookie set by `/authenticate`.
pub fn session_cookie(token: String, config: &ServerConfig) -> Cookie<'static> {
  let same_site = if config.production { SameSite::None } else { SameSite::Strict };
  Cookie::build((TOKEN_COOKIE, token))
    .path("/")
    .http_only(true)
    .secure(config.production)
    .same_site(same_site)
    .build()
}

/// A removal cookie matching [`session_cookie`]'s path.
pub fn cleared_cookie() -> Cookie<'static> {
  Cookie::build(TOKEN_COOKIE).path("/").build()
}
