//! Handlers for sessions, registration and the caller's own profile.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/authenticate` | Body: `{"email"}`; sets the `token` cookie |
//! | `POST`  | `/logout` | Clears the `token` cookie |
//! | `POST`  | `/createuser` | Idempotent; 201 on first registration |
//! | `GET`   | `/users/me?email=` | Either role |
//! | `PATCH` | `/users/profile` | Body: `{"email", "userName"?, "userImage"?, "dateOfBirth"?}` |

use assetflow_core::{
  Email,
  access::Operation,
  accounts::{self, Registration},
  store::AssetStore,
  user::{NewUser, ProfileUpdate, User},
};
use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};

use super::Declared;
use crate::{
  AppState,
  auth::{Session, cleared_cookie, session_cookie},
  error::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct AuthenticateBody {
  pub email: String,
}

/// `POST /authenticate`
///
/// Identity is established upstream; this issues the session for it and
/// returns the matching user record, if one exists yet.
pub async fn authenticate<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  Json(body): Json<AuthenticateBody>,
) -> Result<(CookieJar, Json<Value>), ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let email = Email::parse(&body.email)?;
  let token = state.tokens.sign(&email)?;
  let user = accounts::lookup(state.store.as_ref(), &email).await?;

  tracing::info!(%email, registered = user.is_some(), "session issued");
  Ok((
    jar.add(session_cookie(token, &state.config)),
    Json(json!({ "success": true, "user": user })),
  ))
}

/// `POST /logout`
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
  (jar.remove(cleared_cookie()), Json(json!({ "success": true })))
}

/// `POST /createuser`
pub async fn create_user<S>(
  State(state): State<AppState<S>>,
  Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<Registration>), ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let registration = accounts::register(state.store.as_ref(), input).await?;
  let status = if registration.user_exists { StatusCode::OK } else { StatusCode::CREATED };
  Ok((status, Json(registration)))
}

/// `GET /users/me?email=`
pub async fn profile<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Query(params): Query<Declared>,
) -> Result<Json<User>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::Profile, &params.email).await?;
  Ok(Json(caller.user))
}

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
  #[serde(default)]
  pub email:  String,
  #[serde(flatten)]
  pub update: ProfileUpdate,
}

/// `PATCH /users/profile`
pub async fn update_profile<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Json(body): Json<ProfileBody>,
) -> Result<Json<User>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::UpdateProfile, &body.email).await?;
  let user = accounts::update_profile(state.store.as_ref(), &caller, body.update).await?;
  Ok(Json(user))
}
