//! Handlers for the HR inventory.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/products?email=` | Either; `search`, `type`, `availability`, `sort`, `limit`, `offset` |
//! | `POST`   | `/product/add` | HR; body: `{"email", "productName", "productType", "productQuantity"}` |
//! | `GET`    | `/product/{id}?email=` | Either; 404 outside the caller's company |
//! | `PATCH`  | `/product/{id}` | HR; body: `{"email", ..fields to change}` |
//! | `DELETE` | `/product/{id}?email=` | HR; 409 while units are checked out |

use assetflow_core::{
  access::Operation,
  asset::{Asset, AssetPatch, Availability, ProductDetails, ProductType},
  parse_id,
  store::{AssetStore, ProductFilter, QuantitySort},
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::Deserialize;

use super::Declared;
use crate::{AppState, auth::Session, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub email:        String,
  pub search:       Option<String>,
  #[serde(rename = "type")]
  pub product_type: Option<ProductType>,
  pub availability: Option<Availability>,
  pub sort:         Option<QuantitySort>,
  pub limit:        Option<usize>,
  pub offset:       Option<usize>,
}

/// `GET /products?email=`
pub async fn list<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Asset>>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::ListProducts, &params.email).await?;
  let filter = ProductFilter {
    text:         params.search,
    product_type: params.product_type,
    availability: params.availability,
    sort:         params.sort,
    limit:        params.limit,
    offset:       params.offset,
  };
  Ok(Json(state.inventory.list_products(&caller, filter).await?))
}

// ─── Add ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddBody {
  #[serde(default)]
  pub email:   String,
  #[serde(flatten)]
  pub details: ProductDetails,
}

/// `POST /product/add`
pub async fn add<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Json(body): Json<AddBody>,
) -> Result<(StatusCode, Json<Asset>), ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::AddProduct, &body.email).await?;
  let asset = state.inventory.add_product(&caller, body.details).await?;
  Ok((StatusCode::CREATED, Json(asset)))
}

// ─── Single product ───────────────────────────────────────────────────────────

/// `GET /product/{id}?email=`
pub async fn get_one<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Query(params): Query<Declared>,
) -> Result<Json<Asset>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let caller = session.authorize(&state, Operation::GetProduct, &params.email).await?;
  Ok(Json(state.inventory.get_product(&caller, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  #[serde(default)]
  pub email: String,
  #[serde(flatten)]
  pub patch: AssetPatch,
}

/// `PATCH /product/{id}`
pub async fn update<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Asset>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let caller = session.authorize(&state, Operation::UpdateProduct, &body.email).await?;
  Ok(Json(state.inventory.update_product(&caller, id, body.patch).await?))
}

/// `DELETE /product/{id}?email=`
pub async fn delete<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Query(params): Query<Declared>,
) -> Result<StatusCode, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let caller = session.authorize(&state, Operation::DeleteProduct, &params.email).await?;
  state.inventory.delete_product(&caller, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
