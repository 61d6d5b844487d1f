//! Handlers for custom asset requests: asks for items the company does not
//! stock yet. Deciding them never touches inventory.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/custom-product/request` | Employee; body: `{"email", "assetName", "price", "assetType", "whyNeeded", ..}` |
//! | `GET`  | `/custom-product/requests?email=` | Either; same filters as `/product/requests` |
//! | `POST` | `/custom-product/request/{id}/approve` | HR |
//! | `POST` | `/custom-product/request/{id}/reject` | HR |

use assetflow_core::{
  access::Operation,
  parse_id,
  request::{CustomAssetDetails, CustomAssetRequest},
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
pub struct CreateBody {
  #[serde(default)]
  pub email:   String,
  #[serde(flatten)]
  pub details: CustomAssetDetails,
}

/// `POST /custom-product/request`
pub async fn create<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<CustomAssetRequest>), ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::RequestCustomAsset, &body.email).await?;
  let request = state.workflow.request_custom_asset(&caller, body.details).await?;
  Ok((StatusCode::CREATED, Json(request)))
}

/// `GET /custom-product/requests?email=`
pub async fn list<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Query(params): Query<RequestListParams>,
) -> Result<Json<Vec<CustomAssetRequest>>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let (email, filter) = params.into_parts();
  let caller = session.authorize(&state, Operation::ListCustomRequests, &email).await?;
  Ok(Json(state.workflow.list_custom_requests(&caller, filter).await?))
}

/// `POST /custom-product/request/{id}/approve`
pub async fn approve<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(body): Json<Declared>,
) -> Result<Json<CustomAssetRequest>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let caller = session.authorize(&state, Operation::ApproveCustomRequest, &body.email).await?;
  Ok(Json(state.workflow.approve_custom(&caller, id).await?))
}

/// `POST /custom-product/request/{id}/reject`
pub async fn reject<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(body): Json<Declared>,
) -> Result<Json<CustomAssetRequest>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let caller = session.authorize(&state, Operation::RejectCustomRequest, &body.email).await?;
  Ok(Json(state.workflow.reject_custom(&caller, id).await?))
}
