//! HR inventory management over the asset store.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  access::Caller,
  asset::{Asset, AssetPatch, NewAsset, ProductDetails},
  store::{AssetStore, ProductFilter},
  user::Role,
};

pub struct Inventory<S> {
  store: Arc<S>,
}

impl<S> Clone for Inventory<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: AssetStore> Inventory<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn add_product(&self, caller: &Caller, details: ProductDetails) -> Result<Asset> {
    caller.require(Role::Hr)?;
    let input = NewAsset::from_details(details, caller.email().clone());
    input.validate()?;

    let asset = self.store.insert_product(input).await.map_err(Error::store)?;
    tracing::info!(product_id = %asset.id, owner = %asset.product_added_by, "product added");
    Ok(asset)
  }

  /// A single product, if it lies inside the caller's scope.
  pub async fn get_product(&self, caller: &Caller, id: Uuid) -> Result<Asset> {
    let scope = caller.scope();
    self
      .store
      .get_product(id)
      .await
      .map_err(Error::store)?
      .filter(|a| Some(&a.product_added_by) == scope)
      .ok_or_else(|| Error::NotFound(format!("product {id}")))
  }

  pub async fn update_product(
    &self,
    caller: &Caller,
    id: Uuid,
    patch: AssetPatch,
  ) -> Result<Asset> {
    caller.require(Role::Hr)?;
    patch.validate()?;
    self.get_product(caller, id).await?;

    let asset = self
      .store
      .update_product(id, patch)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("product {id}")))?;
    tracing::info!(product_id = %id, quantity = asset.product_quantity, "product updated");
    Ok(asset)
  }

  pub async fn delete_product(&self, caller: &Caller, id: Uuid) -> Result<()> {
    caller.require(Role::Hr)?;
    self.get_product(caller, id).await?;

    if !self.store.delete_product(id).await.map_err(Error::store)? {
      return Err(Error::NotFound(format!("product {id}")));
    }
    tracing::info!(product_id = %id, by = %caller.email(), "product deleted");
    Ok(())
  }

  /// Products visible to the caller. Unscoped callers get an empty list.
  pub async fn list_products(
    &self,
    caller: &Caller,
    filter: ProductFilter,
  ) -> Result<Vec<Asset>> {
    let Some(scope) = caller.scope() else {
      return Ok(Vec::new());
    };
    self
      .store
      .list_products(scope.clone(), filter)
      .await
      .map_err(Error::store)
  }
}
