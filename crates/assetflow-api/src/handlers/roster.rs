//! Handlers for the HR roster.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/unaffiliated?email=` | HR; employees free to book |
//! | `GET`  | `/users/team?email=` | Either; members of the caller's company |
//! | `POST` | `/users/book` | HR; body: `{"email", "employees": [..]}` |
//! | `POST` | `/users/unbook` | HR; body: `{"email", "employee"}` |

use assetflow_core::{
  Email,
  access::Operation,
  store::AssetStore,
  user::User,
};
use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;

use super::Declared;
use crate::{AppState, auth::Session, error::ApiError};

/// `GET /users/unaffiliated?email=`
pub async fn unaffiliated<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Query(params): Query<Declared>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::ListUnaffiliated, &params.email).await?;
  Ok(Json(state.roster.list_unaffiliated(&caller).await?))
}

/// `GET /users/team?email=`
pub async fn team<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Query(params): Query<Declared>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::ListTeam, &params.email).await?;
  Ok(Json(state.roster.list_team(&caller).await?))
}

#[derive(Debug, Deserialize)]
pub struct BookBody {
  #[serde(default)]
  pub email:     String,
  pub employees: Vec<String>,
}

/// `POST /users/book`. Returns the updated HR record.
pub async fn book<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Json(body): Json<BookBody>,
) -> Result<Json<User>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::BookEmployees, &body.email).await?;
  let employees = body
    .employees
    .iter()
    .map(|e| Email::parse(e))
    .collect::<assetflow_core::Result<Vec<_>>>()?;
  Ok(Json(state.roster.book(&caller, employees).await?))
}

#[derive(Debug, Deserialize)]
pub struct UnbookBody {
  #[serde(default)]
  pub email:    String,
  pub employee: String,
}

/// `POST /users/unbook`. Returns the updated HR record.
pub async fn unbook<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Json(body): Json<UnbookBody>,
) -> Result<Json<User>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::UnbookEmployee, &body.email).await?;
  let employee = Email::parse(&body.employee)?;
  Ok(Json(state.roster.unbook(&caller, employee).await?))
}
