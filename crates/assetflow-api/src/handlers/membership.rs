//! Handlers for membership packages and checkout.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/packages` | Public |
//! | `GET`  | `/membership/check?email=` | HR; `{"limit", "used"}` |
//! | `POST` | `/membership/purchase` | HR; body: `{"email", "package"}` |
//! | `POST` | `/create-payment-intent` | HR; body: `{"email", "package"}` |
//!
//! `/membership/purchase` does not verify payment. It trusts that the client
//! only calls it after the intent from `/create-payment-intent` has been
//! confirmed with the provider, so any HR session can raise its own limit.

use assetflow_core::{
  access::Operation,
  payment::{self, Package, PaymentIntent},
  roster::MembershipStatus,
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

/// `GET /packages`
pub async fn packages<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Package>>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  Ok(Json(payment::load_packages(state.store.as_ref()).await?))
}

/// `GET /membership/check?email=`
pub async fn check<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Query(params): Query<Declared>,
) -> Result<Json<MembershipStatus>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::MembershipCheck, &params.email).await?;
  Ok(Json(state.roster.membership_check(&caller)?))
}

#[derive(Debug, Deserialize)]
pub struct PackageBody {
  #[serde(default)]
  pub email:   String,
  pub package: String,
}

/// `POST /membership/purchase`. Returns the updated HR record.
pub async fn purchase<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Json(body): Json<PackageBody>,
) -> Result<Json<User>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::PurchaseMembership, &body.email).await?;
  Ok(Json(state.roster.purchase_membership(&caller, &body.package).await?))
}

/// `POST /create-payment-intent`
pub async fn payment_intent<S>(
  session: Session,
  State(state): State<AppState<S>>,
  Json(body): Json<PackageBody>,
) -> Result<Json<PaymentIntent>, ApiError>
where
  S: AssetStore + Clone + 'static,
{
  let caller = session.authorize(&state, Operation::CreatePaymentIntent, &body.email).await?;
  let intent = payment::create_payment_intent(
    state.store.as_ref(),
    state.payments.as_ref(),
    &caller,
    &body.package,
  )
  .await?;
  Ok(Json(intent))
}
