//! Handlers for asset requests.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/product/request` | Employee; body: `{"email", "productId", "note"?}` |
//! | `GET`  | `/product/requests?email=` | Either; `search`, `type`, `status`, `limit`, `offset` |
//! | `POST` | `/product/request/{id}/approve` | HR; decrements stock |
//! | `POST` | `/product/request/{id}/reject` | HR |
//! | `POST` | `/product/request/{id}/return` | Requesting employee; restores stock |

use assetflow_core::{
  access::Operation,
  parse_id,
  request::AssetRequest,
  store::AssetStore,
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::Deserialize;

use super::{Declared, RequestListParams};
use crate::{AppState, auth::Session, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  #[serde(default)]
  pub email:      String,
  pub product_id: String,
  #[serde(default)]
  pub note:       Option<String>,
}

/// `POST /product/request`
pub async fn create<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<AssetRequest>), ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let product_id = parse_id(&body.product_id)?;
  let caller = session.authorize(&state, Operation::RequestAsset, &body.email).await?;
  let request = state.workflow.request_asset(&caller, product_id, body.note).await?;
  Ok((StatusCode::CREATED, Json(request)))
}

/// `GET /product/requests?email=`
pub async fn list<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Query(params): Query<RequestListParams>,
) -> Result<Json<Vec<AssetRequest>>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let (email, filter) = params.into_parts();
  let caller = session.authorize(&state, Operation::ListRequests, &email).await?;
  Ok(Json(state.workflow.list_requests(&caller, filter).await?))
}

/// `POST /product/request/{id}/approve`
pub async fn approve<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(body): Json<Declared>,
) -> Result<Json<AssetRequest>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let caller = session.authorize(&state, Operation::ApproveRequest, &body.email).await?;
  Ok(Json(state.workflow.approve(&caller, id).await?))
}

/// `POST /product/request/{id}/reject`
pub async fn reject<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(body): Json<Declared>,
) -> Result<Json<AssetRequest>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let caller = session.authorize(&state, Operation::RejectRequest, &body.email).await?;
  Ok(Json(state.workflow.reject(&caller, id).await?))
}

/// `POST /product/request/{id}/return`
pub async fn return_asset<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(body): Json<Declared>,
) -> Result<Json<AssetRequest>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let caller = session.authorize(&state, Operation::ReturnRequest, &body.email).await?;
  Ok(Json(state.workflow.return_asset(&caller, id).await?))
}
