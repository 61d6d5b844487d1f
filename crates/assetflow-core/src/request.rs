//! Asset requests and their lifecycle.
//!
//! ```text
//! pending ──approve──▶ approved ──return──▶ returned
//!    │
//!    └─────reject────▶ rejected
//! ```
//!
//! `returned` and `rejected` are terminal. Approving a request checks one unit
//! of the linked asset out; returning it checks the unit back in. Custom
//! requests follow the same machine but have no linked asset.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Email, Error, Result, asset::ProductType};

// ─── Status machine ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
  Pending,
  Approved,
  Rejected,
  Returned,
}

impl ApprovalStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
      Self::Returned => "returned",
    }
  }

  /// The status reached by applying `action`, or
  /// [`Error::InvalidTransition`] if the machine has no such edge.
  pub fn apply(self, action: Transition) -> Result<Self> {
    match (self, action) {
      (Self::Pending, Transition::Approve) => Ok(Self::Approved),
      (Self::Pending, Transition::Reject) => Ok(Self::Rejected),
      (Self::Approved, Transition::Return) => Ok(Self::Returned),
      (from, action) => Err(Error::InvalidTransition { from, action }),
    }
  }

  pub fn is_terminal(self) -> bool { matches!(self, Self::Rejected | Self::Returned) }
}

impl fmt::Display for ApprovalStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
  Approve,
  Reject,
  Return,
}

impl Transition {
  /// Change applied to the linked asset's `product_quantity`.
  pub fn stock_delta(self) -> i64 {
    match self {
      Self::Approve => -1,
      Self::Reject => 0,
      Self::Return => 1,
    }
  }

  /// Approval stamps `approval_date`; every other transition clears it.
  pub fn stamps_approval_date(self) -> bool { matches!(self, Self::Approve) }
}

impl fmt::Display for Transition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Approve => "approve",
      Self::Reject => "reject",
      Self::Return => "return",
    })
  }
}

// ─── Asset request ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
  pub id:              Uuid,
  pub product_id:      Uuid,
  /// Copied from the asset at request time so listings survive edits.
  pub product_name:    String,
  pub product_type:    ProductType,
  pub user_email:      Email,
  pub user_name:       String,
  /// The HR the request is addressed to.
  pub company_email:   Email,
  pub note:            Option<String>,
  pub approval_status: ApprovalStatus,
  pub approval_date:   Option<DateTime<Utc>>,
  pub requested_at:    DateTime<Utc>,
}

/// Input to [`crate::store::AssetStore::insert_request`]. Requests are always
/// created `pending`.
#[derive(Debug, Clone)]
pub struct NewAssetRequest {
  pub product_id:    Uuid,
  pub product_name:  String,
  pub product_type:  ProductType,
  pub user_email:    Email,
  pub user_name:     String,
  pub company_email: Email,
  pub note:          Option<String>,
}

// ─── Custom asset request ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAssetRequest {
  pub id:              Uuid,
  pub asset_name:      String,
  pub price:           f64,
  pub asset_type:      ProductType,
  pub asset_image:     Option<String>,
  pub why_needed:      String,
  pub additional_info: Option<String>,
  pub user_email:      Email,
  pub user_name:       String,
  pub company_email:   Email,
  pub approval_status: ApprovalStatus,
  pub approval_date:   Option<DateTime<Utc>>,
  pub requested_at:    DateTime<Utc>,
}

/// What an employee fills in when asking for an asset the company does not
/// stock yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAssetDetails {
  pub asset_name:      String,
  pub price:           f64,
  pub asset_type:      ProductType,
  #[serde(default)]
  pub asset_image:     Option<String>,
  pub why_needed:      String,
  #[serde(default)]
  pub additional_info: Option<String>,
}

impl CustomAssetDetails {
  pub fn validate(&self) -> Result<()> {
    if self.asset_name.trim().is_empty() {
      return Err(Error::Validation("assetName must not be empty".into()));
    }
    if !self.price.is_finite() || self.price < 0.0 {
      return Err(Error::Validation(format!("invalid price: {}", self.price)));
    }
    if self.why_needed.trim().is_empty() {
      return Err(Error::Validation("whyNeeded must not be empty".into()));
    }
    Ok(())
  }
}

/// Input to [`crate::store::AssetStore::insert_custom_request`].
#[derive(Debug, Clone)]
pub struct NewCustomAssetRequest {
  pub details:       CustomAssetDetails,
  pub user_email:    Email,
  pub user_name:     String,
  pub company_email: Email,
}

#[cfg(test)]
mod tests {
  use super::*;

  use ApprovalStatus::*;
  use Transition::*;

  #[test]
  fn legal_edges() {
    assert_eq!(Pending.apply(Approve).unwrap(), Approved);
    assert_eq!(Pending.apply(Reject).unwrap(), Rejected);
    assert_eq!(Approved.apply(Return).unwrap(), Returned);
  }

  #[test]
  fn return_only_from_approved() {
    for from in [Pending, Rejected, Returned] {
      assert!(matches!(
        from.apply(Return),
        Err(Error::InvalidTransition { action: Return, .. })
      ));
    }
  }

  #[test]
  fn approve_and_reject_only_from_pending() {
    for from in [Approved, Rejected, Returned] {
      assert!(from.apply(Approve).is_err(), "approve from {from}");
      assert!(from.apply(Reject).is_err(), "reject from {from}");
    }
  }

  #[test]
  fn terminal_states_have_no_exits() {
    for from in [Rejected, Returned] {
      assert!(from.is_terminal());
      for action in [Approve, Reject, Return] {
        assert!(from.apply(action).is_err());
      }
    }
  }

  #[test]
  fn stock_deltas_cancel_out() {
    assert_eq!(Approve.stock_delta() + Return.stock_delta(), 0);
    assert_eq!(Reject.stock_delta(), 0);
  }

  #[test]
  fn custom_details_reject_negative_price() {
    let details = CustomAssetDetails {
      asset_name:      "Standing desk".into(),
      price:           -1.0,
      asset_type:      ProductType::Returnable,
      asset_image:     None,
      why_needed:      "back pain".into(),
      additional_info: None,
    };
    assert!(matches!(details.validate(), Err(Error::Validation(_))));
  }
}
