//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, dates of birth as
//! `YYYY-MM-DD`, UUIDs as hyphenated lowercase strings and enums as their
//! lowercase wire names.

use std::collections::BTreeSet;

use assetflow_core::{
  Email,
  asset::{Asset, ProductType},
  request::{ApprovalStatus, AssetRequest, CustomAssetRequest},
  user::{Role, User},
};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

pub fn decode_email(s: &str) -> Result<Email> {
  Email::parse(s).map_err(|_| Error::Decode(format!("email {s:?}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "hr" => Ok(Role::Hr),
    "employee" => Ok(Role::Employee),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

pub fn decode_product_type(s: &str) -> Result<ProductType> {
  match s {
    "returnable" => Ok(ProductType::Returnable),
    "non_returnable" => Ok(ProductType::NonReturnable),
    other => Err(Error::Decode(format!("unknown product type: {other:?}"))),
  }
}

pub fn decode_status(s: &str) -> Result<ApprovalStatus> {
  match s {
    "pending" => Ok(ApprovalStatus::Pending),
    "approved" => Ok(ApprovalStatus::Approved),
    "rejected" => Ok(ApprovalStatus::Rejected),
    "returned" => Ok(ApprovalStatus::Returned),
    other => Err(Error::Decode(format!("unknown approval status: {other:?}"))),
  }
}

fn decode_count(n: i64, column: &str) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::Decode(format!("{column} out of range: {n}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "user_email, user_name, user_role, user_image, \
  date_of_birth, company_name, company_logo, current_working_company_email, \
  current_working_company_name, current_working_company_image, \
  current_membership_limit, created_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_email:                    String,
  pub user_name:                     String,
  pub user_role:                     String,
  pub user_image:                    Option<String>,
  pub date_of_birth:                 Option<String>,
  pub company_name:                  Option<String>,
  pub company_logo:                  Option<String>,
  pub current_working_company_email: Option<String>,
  pub current_working_company_name:  Option<String>,
  pub current_working_company_image: Option<String>,
  pub current_membership_limit:      i64,
  pub created_at:                    String,
}

impl RawUser {
  /// Map a row selected with [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_email:                    row.get(0)?,
      user_name:                     row.get(1)?,
      user_role:                     row.get(2)?,
      user_image:                    row.get(3)?,
      date_of_birth:                 row.get(4)?,
      company_name:                  row.get(5)?,
      company_logo:                  row.get(6)?,
      current_working_company_email: row.get(7)?,
      current_working_company_name:  row.get(8)?,
      current_working_company_image: row.get(9)?,
      current_membership_limit:      row.get(10)?,
      created_at:                    row.get(11)?,
    })
  }

  /// Decode the row; `employees` are the emails pointing back at this user.
  pub fn into_user(self, employees: Vec<String>) -> Result<User> {
    Ok(User {
      user_email:                    decode_email(&self.user_email)?,
      user_name:                     self.user_name,
      user_role:                     decode_role(&self.user_role)?,
      user_image:                    self.user_image,
      date_of_birth:                 self.date_of_birth.as_deref().map(decode_date).transpose()?,
      company_name:                  self.company_name,
      company_logo:                  self.company_logo,
      current_working_company_email: self
        .current_working_company_email
        .as_deref()
        .map(decode_email)
        .transpose()?,
      current_working_company_name:  self.current_working_company_name,
      current_working_company_image: self.current_working_company_image,
      current_membership_limit:      decode_count(
        self.current_membership_limit,
        "current_membership_limit",
      )?,
      current_employees:             employees
        .iter()
        .map(|e| decode_email(e))
        .collect::<Result<BTreeSet<_>>>()?,
      created_at:                    decode_dt(&self.created_at)?,
    })
  }
}

pub const PRODUCT_COLUMNS: &str =
  "id, product_name, product_type, product_quantity, product_added_by, added_at";

/// Raw values read directly from a `products` row.
pub struct RawAsset {
  pub id:               String,
  pub product_name:     String,
  pub product_type:     String,
  pub product_quantity: i64,
  pub product_added_by: String,
  pub added_at:         String,
}

impl RawAsset {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      product_name:     row.get(1)?,
      product_type:     row.get(2)?,
      product_quantity: row.get(3)?,
      product_added_by: row.get(4)?,
      added_at:         row.get(5)?,
    })
  }

  pub fn into_asset(self) -> Result<Asset> {
    Ok(Asset {
      id:               decode_uuid(&self.id)?,
      product_name:     self.product_name,
      product_type:     decode_product_type(&self.product_type)?,
      product_quantity: decode_count(self.product_quantity, "product_quantity")?,
      product_added_by: decode_email(&self.product_added_by)?,
      added_at:         decode_dt(&self.added_at)?,
    })
  }
}

pub const REQUEST_COLUMNS: &str = "id, product_id, product_name, product_type, \
  user_email, user_name, company_email, note, approval_status, approval_date, \
  requested_at";

/// Raw values read directly from a `products_requested` row.
pub struct RawAssetRequest {
  pub id:              String,
  pub product_id:      String,
  pub product_name:    String,
  pub product_type:    String,
  pub user_email:      String,
  pub user_name:       String,
  pub company_email:   String,
  pub note:            Option<String>,
  pub approval_status: String,
  pub approval_date:   Option<String>,
  pub requested_at:    String,
}

impl RawAssetRequest {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      product_id:      row.get(1)?,
      product_name:    row.get(2)?,
      product_type:    row.get(3)?,
      user_email:      row.get(4)?,
      user_name:       row.get(5)?,
      company_email:   row.get(6)?,
      note:            row.get(7)?,
      approval_status: row.get(8)?,
      approval_date:   row.get(9)?,
      requested_at:    row.get(10)?,
    })
  }

  pub fn into_request(self) -> Result<AssetRequest> {
    Ok(AssetRequest {
      id:              decode_uuid(&self.id)?,
      product_id:      decode_uuid(&self.product_id)?,
      product_name:    self.product_name,
      product_type:    decode_product_type(&self.product_type)?,
      user_email:      decode_email(&self.user_email)?,
      user_name:       self.user_name,
      company_email:   decode_email(&self.company_email)?,
      note:            self.note,
      approval_status: decode_status(&self.approval_status)?,
      approval_date:   self.approval_date.as_deref().map(decode_dt).transpose()?,
      requested_at:    decode_dt(&self.requested_at)?,
    })
  }
}

pub const CUSTOM_REQUEST_COLUMNS: &str = "id, asset_name, price, asset_type, \
  asset_image, why_needed, additional_info, user_email, user_name, \
  company_email, approval_status, approval_date, requested_at";

/// Raw values read directly from a `products_requested_custom` row.
pub struct RawCustomRequest {
  pub id:              String,
  pub asset_name:      String,
  pub price:           f64,
  pub asset_type:      String,
  pub asset_image:     Option<String>,
  pub why_needed:      String,
  pub additional_info: Option<String>,
  pub user_email:      String,
  pub user_name:       String,
  pub company_email:   String,
  pub approval_status: String,
  pub approval_date:   Option<String>,
  pub requested_at:    String,
}

impl RawCustomRequest {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      asset_name:      row.get(1)?,
      price:           row.get(2)?,
      asset_type:      row.get(3)?,
      asset_image:     row.get(4)?,
      why_needed:      row.get(5)?,
      additional_info: row.get(6)?,
      user_email:      row.get(7)?,
      user_name:       row.get(8)?,
      company_email:   row.get(9)?,
      approval_status: row.get(10)?,
      approval_date:   row.get(11)?,
      requested_at:    row.get(12)?,
    })
  }

  pub fn into_request(self) -> Result<CustomAssetRequest> {
    Ok(CustomAssetRequest {
      id:              decode_uuid(&self.id)?,
      asset_name:      self.asset_name,
      price:           self.price,
      asset_type:      decode_product_type(&self.asset_type)?,
      asset_image:     self.asset_image,
      why_needed:      self.why_needed,
      additional_info: self.additional_info,
      user_email:      decode_email(&self.user_email)?,
      user_name:       self.user_name,
      company_email:   decode_email(&self.company_email)?,
      approval_status: decode_status(&self.approval_status)?,
      approval_date:   self.approval_date.as_deref().map(decode_dt).transpose()?,
      requested_at:    decode_dt(&self.requested_at)?,
    })
  }
}
