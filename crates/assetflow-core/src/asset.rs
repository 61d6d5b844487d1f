//! Assets (products): the physical inventory an HR user manages.
//!
//! `product_quantity` counts the units not currently checked out. It is only
//! ever moved by one unit at a time by the request workflow, or set outright
//! by its owner through an [`AssetPatch`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Email, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
  Returnable,
  NonReturnable,
}

impl ProductType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Returnable => "returnable",
      Self::NonReturnable => "non_returnable",
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
  pub id:               Uuid,
  pub product_name:     String,
  pub product_type:     ProductType,
  pub product_quantity: u32,
  /// The owning HR; doubles as the company scope of the asset.
  pub product_added_by: Email,
  pub added_at:         DateTime<Utc>,
}

/// What an HR user fills in when adding an asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
  pub product_name:     String,
  pub product_type:     ProductType,
  pub product_quantity: u32,
}

/// Input to [`crate::store::AssetStore::insert_product`].
#[derive(Debug, Clone)]
pub struct NewAsset {
  pub product_name:     String,
  pub product_type:     ProductType,
  pub product_quantity: u32,
  pub product_added_by: Email,
}

impl NewAsset {
  /// Attach the owning HR to `details`.
  pub fn from_details(details: ProductDetails, owner: Email) -> Self {
    Self {
      product_name:     details.product_name.trim().to_owned(),
      product_type:     details.product_type,
      product_quantity: details.product_quantity,
      product_added_by: owner,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.product_name.trim().is_empty() {
      return Err(Error::Validation("productName must not be empty".into()));
    }
    Ok(())
  }
}

/// Partial update of an asset. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPatch {
  pub product_name:     Option<String>,
  pub product_type:     Option<ProductType>,
  pub product_quantity: Option<u32>,
}

impl AssetPatch {
  pub fn is_empty(&self) -> bool {
    self.product_name.is_none()
      && self.product_type.is_none()
      && self.product_quantity.is_none()
  }

  pub fn validate(&self) -> Result<()> {
    if self.is_empty() {
      return Err(Error::Validation("patch changes nothing".into()));
    }
    if self.product_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::Validation("productName must not be empty".into()));
    }
    Ok(())
  }
}

/// Stock filter for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
  /// At least one unit on the shelf.
  Available,
  OutOfStock,
}

impl Availability {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Available => "available",
      Self::OutOfStock => "out_of_stock",
    }
  }
}
