//! HTTP surface for AssetFlow.
//!
//! Exposes an axum [`Router`] backed by any [`AssetStore`]. Every protected
//! route authenticates with the `token` session cookie, then authorizes the
//! operation against the [`AccessPolicy`] table before handing a
//! [`Caller`](assetflow_core::access::Caller) to the core engines.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod payment;
pub mod session;

pub use config::ServerConfig;
pub use error::ApiError;

use std::sync::Arc;

use assetflow_core::{
  access::AccessPolicy,
  inventory::Inventory,
  payment::PaymentProvider,
  roster::Roster,
  store::AssetStore,
  workflow::RequestWorkflow,
};
use axum::{
  Router,
  http::{HeaderValue, Method, header},
  routing::{get, patch, post},
};
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

use handlers::{accounts, custom_requests, membership, products, requests, roster};
use session::TokenService;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: AssetStore> {
  pub store:     Arc<S>,
  pub config:    Arc<ServerConfig>,
  pub tokens:    Arc<TokenService>,
  pub policy:    Arc<AccessPolicy>,
  pub workflow:  RequestWorkflow<S>,
  pub inventory: Inventory<S>,
  pub roster:    Roster<S>,
  pub payments:  Arc<dyn PaymentProvider>,
}

impl<S: AssetStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig, payments: Arc<dyn PaymentProvider>) -> Self {
    let store = Arc::new(store);
    let tokens = TokenService::new(
      config.token_secret.as_bytes(),
      chrono::Duration::hours(i64::from(config.token_ttl_hours)),
    );
    let policy = AccessPolicy::with_overrides(config.access.clone());

    Self {
      workflow: RequestWorkflow::new(store.clone(), config.workflow.clone()),
      inventory: Inventory::new(store.clone()),
      roster: Roster::new(store.clone(), config.roster.clone()),
      store,
      config: Arc::new(config),
      tokens: Arc::new(tokens),
      policy: Arc::new(policy),
      payments,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the API server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AssetStore + Clone + 'static,
{
  let cors = cors_layer(&state.config);

  Router::new()
    // Accounts
    .route("/authenticate", post(accounts::authenticate::<S>))
    .route("/logout", post(accounts::logout))
    .route("/createuser", post(accounts::create_user::<S>))
    .route("/users/me", get(accounts::profile::<S>))
    .route("/users/profile", patch(accounts::update_profile::<S>))
    // Roster
    .route("/users/unaffiliated", get(roster::unaffiliated::<S>))
    .route("/users/team", get(roster::team::<S>))
    .route("/users/book", post(roster::book::<S>))
    .route("/users/unbook", post(roster::unbook::<S>))
    // Membership
    .route("/packages", get(membership::packages::<S>))
    .route("/membership/check", get(membership::check::<S>))
    .route("/membership/purchase", post(membership::purchase::<S>))
    .route("/create-payment-intent", post(membership::payment_intent::<S>))
    // Products
    .route("/products", get(products::list::<S>))
    .route("/product/add", post(products::add::<S>))
    .route(
      "/product/{id}",
      get(products::get_one::<S>)
        .patch(products::update::<S>)
        .delete(products::delete::<S>),
    )
    // Asset requests
    .route("/product/request", post(requests::create::<S>))
    .route("/product/requests", get(requests::list::<S>))
    .route("/product/request/{id}/approve", post(requests::approve::<S>))
    .route("/product/request/{id}/reject", post(requests::reject::<S>))
    .route("/product/request/{id}/return", post(requests::return_asset::<S>))
    // Custom asset requests
    .route("/custom-product/request", post(custom_requests::create::<S>))
    .route("/custom-product/requests", get(custom_requests::list::<S>))
    .route("/custom-product/request/{id}/approve", post(custom_requests::approve::<S>))
    .route("/custom-product/request/{id}/reject", post(custom_requests::reject::<S>))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
  let origins: Vec<HeaderValue> = config
    .allowed_origins
    .iter()
    .filter_map(|origin| match HeaderValue::from_str(origin) {
      Ok(value) => Some(value),
      Err(_) => {
        tracing::warn!(%origin, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
    .allow_headers([header::CONTENT_TYPE])
    .allow_credentials(true)
}

#[cfg(test)]
mod tests;
