//! Route handlers, grouped by resource.
//!
//! Read-style calls declare the caller's email as `?email=`; write-style
//! calls carry it as `"email"` in the JSON body. Either way it is checked
//! against the session before anything else happens.

pub mod accounts;
pub mod custom_requests;
pub mod membership;
pub mod products;
pub mod requests;
pub mod roster;

use assetflow_core::{
  asset::ProductType,
  request::ApprovalStatus,
  store::RequestFilter,
};
use serde::Deserialize;

/// A bare declared email, as a query string or a JSON body.
#[derive(Debug, Deserialize)]
pub struct Declared {
  #[serde(default)]
  pub email: String,
}

/// Query parameters shared by the request and custom-request listings.
#[derive(Debug, Deserialize)]
pub struct RequestListParams {
  #[serde(default)]
  pub email:        String,
  pub search:       Option<String>,
  #[serde(rename = "type")]
  pub product_type: Option<ProductType>,
  pub status:       Option<ApprovalStatus>,
  pub limit:        Option<usize>,
  pub offset:       Option<usize>,
}

impl RequestListParams {
  pub fn into_parts(self) -> (String, RequestFilter) {
    (self.email, RequestFilter {
      text:         self.search,
      product_type: self.product_type,
      status:       self.status,
      limit:        self.limit,
      offset:       self.offset,
    })
  }
}
