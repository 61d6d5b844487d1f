//! Request workflow engine.
//!
//! Drives asset requests and custom asset requests through the status
//! machine in [`crate::request`]. Every state change is delegated to a single
//! atomic store call ([`AssetStore::transition_request`] /
//! [`AssetStore::transition_custom_request`]); this module only decides
//! *whether* the caller may make it.
//!
//! Ownership rules:
//! - an employee may only request assets inside their company scope;
//! - HR may only decide requests addressed to their own company;
//! - an employee may only return their own requests.
//!
//! Requests outside those bounds are reported as `NotFound`, so callers
//! cannot probe another company's identifiers.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::Caller,
  request::{
    AssetRequest, CustomAssetDetails, CustomAssetRequest, NewAssetRequest,
    NewCustomAssetRequest, Transition,
  },
  store::{AssetStore, RequestFilter},
  user::Role,
};

/// Workflow switches, read from the `[workflow]` config table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowConfig {
  /// Refuse a new request while the same employee already has a pending one
  /// for the same asset.
  #[serde(default)]
  pub reject_duplicate_pending: bool,
}

pub struct RequestWorkflow<S> {
  store:  Arc<S>,
  config: WorkflowConfig,
}

impl<S> Clone for RequestWorkflow<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), config: self.config.clone() }
  }
}

impl<S: AssetStore> RequestWorkflow<S> {
  pub fn new(store: Arc<S>, config: WorkflowConfig) -> Self { Self { store, config } }

  // ── Asset requests ────────────────────────────────────────────────────

  /// Create a `pending` request for one unit of `product_id`.
  pub async fn request_asset(
    &self,
    caller: &Caller,
    product_id: Uuid,
    note: Option<String>,
  ) -> Result<AssetRequest> {
    caller.require(Role::Employee)?;
    let not_found = || Error::NotFound(format!("product {product_id}"));

    let company = caller.scope().ok_or_else(not_found)?.clone();
    let asset = self
      .store
      .get_product(product_id)
      .await
      .map_err(Error::store)?
      .filter(|a| a.product_added_by == company)
      .ok_or_else(not_found)?;

    if self.config.reject_duplicate_pending
      && self
        .store
        .has_pending_request(product_id, caller.email().clone())
        .await
        .map_err(Error::store)?
    {
      return Err(Error::Conflict(format!(
        "a request for {} is already pending",
        asset.product_name
      )));
    }

    let request = self
      .store
      .insert_request(NewAssetRequest {
        product_id,
        product_name: asset.product_name,
        product_type: asset.product_type,
        user_email: caller.email().clone(),
        user_name: caller.user.user_name.clone(),
        company_email: company,
        note: note.filter(|n| !n.trim().is_empty()),
      })
      .await
      .map_err(Error::store)?;

    tracing::info!(
      request_id = %request.id,
      %product_id,
      requester = %caller.email(),
      "asset requested"
    );
    Ok(request)
  }

  pub async fn approve(&self, caller: &Caller, id: Uuid) -> Result<AssetRequest> {
    self.decide(caller, id, Transition::Approve).await
  }

  pub async fn reject(&self, caller: &Caller, id: Uuid) -> Result<AssetRequest> {
    self.decide(caller, id, Transition::Reject).await
  }

  /// Return an approved asset, putting its unit back on the shelf.
  pub async fn return_asset(&self, caller: &Caller, id: Uuid) -> Result<AssetRequest> {
    caller.require(Role::Employee)?;
    self
      .visible_request(id, |r| &r.user_email == caller.email())
      .await?;
    self.apply(caller, id, Transition::Return).await
  }

  async fn decide(
    &self,
    caller: &Caller,
    id: Uuid,
    action: Transition,
  ) -> Result<AssetRequest> {
    caller.require(Role::Hr)?;
    self
      .visible_request(id, |r| &r.company_email == caller.email())
      .await?;
    self.apply(caller, id, action).await
  }

  async fn visible_request(
    &self,
    id: Uuid,
    visible: impl Fn(&AssetRequest) -> bool,
  ) -> Result<AssetRequest> {
    self
      .store
      .get_request(id)
      .await
      .map_err(Error::store)?
      .filter(|r| visible(r))
      .ok_or_else(|| Error::NotFound(format!("request {id}")))
  }

  async fn apply(
    &self,
    caller: &Caller,
    id: Uuid,
    action: Transition,
  ) -> Result<AssetRequest> {
    let updated = self
      .store
      .transition_request(id, action)
      .await
      .map_err(Error::store)?;
    tracing::info!(
      request_id = %id,
      product_id = %updated.product_id,
      %action,
      status = %updated.approval_status,
      by = %caller.email(),
      "request transitioned"
    );
    Ok(updated)
  }

  /// Requests visible to the caller. Unscoped callers get an empty list.
  pub async fn list_requests(
    &self,
    caller: &Caller,
    filter: RequestFilter,
  ) -> Result<Vec<AssetRequest>> {
    let Some(scope) = caller.request_scope() else {
      return Ok(Vec::new());
    };
    self
      .store
      .list_requests(scope, filter)
      .await
      .map_err(Error::store)
  }

  // ── Custom asset requests ─────────────────────────────────────────────

  /// Ask the caller's company for an asset it does not stock yet.
  pub async fn request_custom_asset(
    &self,
    caller: &Caller,
    details: CustomAssetDetails,
  ) -> Result<CustomAssetRequest> {
    caller.require(Role::Employee)?;
    details.validate()?;
    let company = caller
      .scope()
      .ok_or_else(|| Error::Conflict("not booked under any company".into()))?
      .clone();

    let request = self
      .store
      .insert_custom_request(NewCustomAssetRequest {
        details,
        user_email: caller.email().clone(),
        user_name: caller.user.user_name.clone(),
        company_email: company,
      })
      .await
      .map_err(Error::store)?;

    tracing::info!(
      request_id = %request.id,
      requester = %caller.email(),
      "custom asset requested"
    );
    Ok(request)
  }

  pub async fn approve_custom(
    &self,
    caller: &Caller,
    id: Uuid,
  ) -> Result<CustomAssetRequest> {
    self.decide_custom(caller, id, Transition::Approve).await
  }

  pub async fn reject_custom(
    &self,
    caller: &Caller,
    id: Uuid,
  ) -> Result<CustomAssetRequest> {
    self.decide_custom(caller, id, Transition::Reject).await
  }

  async fn decide_custom(
    &self,
    caller: &Caller,
    id: Uuid,
    action: Transition,
  ) -> Result<CustomAssetRequest> {
    caller.require(Role::Hr)?;
    self
      .store
      .get_custom_request(id)
      .await
      .map_err(Error::store)?
      .filter(|r| &r.company_email == caller.email())
      .ok_or_else(|| Error::NotFound(format!("custom request {id}")))?;

    let updated = self
      .store
      .transition_custom_request(id, action)
      .await
      .map_err(Error::store)?;
    tracing::info!(
      request_id = %id,
      %action,
      status = %updated.approval_status,
      by = %caller.email(),
      "custom request transitioned"
    );
    Ok(updated)
  }

  pub async fn list_custom_requests(
    &self,
    caller: &Caller,
    filter: RequestFilter,
  ) -> Result<Vec<CustomAssetRequest>> {
    let Some(scope) = caller.request_scope() else {
      return Ok(Vec::new());
    };
    self
      .store
      .list_custom_requests(scope, filter)
      .await
      .map_err(Error::store)
  }
}
