//! The `AssetStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `assetflow-store-sqlite`). The access layer, the request workflow and the
//! roster manager depend on this abstraction, never on a concrete backend;
//! the store handle is injected into each of them.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Email,
  asset::{Asset, AssetPatch, Availability, NewAsset, ProductType},
  request::{
    AssetRequest, ApprovalStatus, CustomAssetRequest, NewAssetRequest,
    NewCustomAssetRequest, Transition,
  },
  user::{NewUser, ProfileUpdate, User},
};

// ─── Query types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantitySort {
  Asc,
  Desc,
}

/// Caller-supplied filters for product listings. Scoping is applied
/// separately and cannot be widened through a filter.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
  /// Case-insensitive substring match on the product name.
  pub text:         Option<String>,
  pub product_type: Option<ProductType>,
  pub availability: Option<Availability>,
  pub sort:         Option<QuantitySort>,
  pub limit:        Option<usize>,
  pub offset:       Option<usize>,
}

/// Caller-supplied filters for request listings (plain and custom).
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
  /// Case-insensitive substring match on the asset name, requester email or
  /// requester name.
  pub text:         Option<String>,
  pub product_type: Option<ProductType>,
  pub status:       Option<ApprovalStatus>,
  pub limit:        Option<usize>,
  pub offset:       Option<usize>,
}

/// Which requests a listing may see: everything addressed to `company`,
/// optionally narrowed to a single requester.
#[derive(Debug, Clone)]
pub struct RequestScope {
  pub company:   Email,
  pub requester: Option<Email>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an AssetFlow persistence backend.
///
/// Methods that move stock or roster state (`transition_request`,
/// `book_employees`, `unbook_employee`, `add_membership_limit`,
/// `delete_product`) must be atomic: either every write they imply is
/// committed or none is, and concurrent calls must not lose updates.
///
/// Domain rejections (`NotFound`, `Conflict`, `InvalidTransition`) are
/// reported through `Self::Error` and must survive conversion into
/// [`crate::Error`] unchanged.
pub trait AssetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails with `Conflict` if the email is taken.
  fn insert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    email: Email,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn update_profile(
    &self,
    email: Email,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Employees not booked under any company.
  fn list_unaffiliated_employees(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Every user whose `current_working_company_email` is `company`.
  fn list_company_members(
    &self,
    company: Email,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Roster ────────────────────────────────────────────────────────────

  /// Book `employees` under the HR `hr` and return the updated HR record.
  ///
  /// Fails with `NotFound` for unknown emails and `Conflict` for non-employees
  /// or employees booked under another HR. Employees already booked under
  /// `hr` are left as they are. With `enforce_limit`, a booking that would
  /// take the roster past `current_membership_limit` is rejected as a whole.
  fn book_employees(
    &self,
    hr: Email,
    employees: Vec<Email>,
    enforce_limit: bool,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Clear `employee`'s company link if it points at `hr`; otherwise do
  /// nothing. Returns the HR record.
  fn unbook_employee(
    &self,
    hr: Email,
    employee: Email,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Raise an HR's membership limit by `members`, server-side.
  fn add_membership_limit(
    &self,
    hr: Email,
    members: u32,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Products ──────────────────────────────────────────────────────────

  fn insert_product(
    &self,
    input: NewAsset,
  ) -> impl Future<Output = Result<Asset, Self::Error>> + Send + '_;

  fn get_product(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Asset>, Self::Error>> + Send + '_;

  fn update_product(
    &self,
    id: Uuid,
    patch: AssetPatch,
  ) -> impl Future<Output = Result<Option<Asset>, Self::Error>> + Send + '_;

  /// Delete a product. Fails with `Conflict` while any request for it is
  /// `approved`; pending requests for it are rejected in the same unit of
  /// work. Returns `false` if the product did not exist.
  fn delete_product(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Products added by `scope`, filtered.
  fn list_products(
    &self,
    scope: Email,
    filter: ProductFilter,
  ) -> impl Future<Output = Result<Vec<Asset>, Self::Error>> + Send + '_;

  // ── Asset requests ────────────────────────────────────────────────────

  fn insert_request(
    &self,
    input: NewAssetRequest,
  ) -> impl Future<Output = Result<AssetRequest, Self::Error>> + Send + '_;

  fn get_request(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<AssetRequest>, Self::Error>> + Send + '_;

  /// Whether `requester` already has a pending request for `product_id`.
  fn has_pending_request(
    &self,
    product_id: Uuid,
    requester: Email,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_requests(
    &self,
    scope: RequestScope,
    filter: RequestFilter,
  ) -> impl Future<Output = Result<Vec<AssetRequest>, Self::Error>> + Send + '_;

  /// Apply `action` to a request and move the linked asset's quantity by
  /// [`Transition::stock_delta`] in one atomic unit.
  ///
  /// Fails with `NotFound` if the request or its asset is gone,
  /// `InvalidTransition` if the status machine forbids the edge, and
  /// `Conflict` if an approval would take the quantity below zero. On any
  /// failure neither the request nor the asset is changed.
  fn transition_request(
    &self,
    id: Uuid,
    action: Transition,
  ) -> impl Future<Output = Result<AssetRequest, Self::Error>> + Send + '_;

  // ── Custom asset requests ─────────────────────────────────────────────

  fn insert_custom_request(
    &self,
    input: NewCustomAssetRequest,
  ) -> impl Future<Output = Result<CustomAssetRequest, Self::Error>> + Send + '_;

  fn get_custom_request(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CustomAssetRequest>, Self::Error>> + Send + '_;

  fn list_custom_requests(
    &self,
    scope: RequestScope,
    filter: RequestFilter,
  ) -> impl Future<Output = Result<Vec<CustomAssetRequest>, Self::Error>> + Send + '_;

  /// Apply `action` to a custom request. Never touches the product table.
  fn transition_custom_request(
    &self,
    id: Uuid,
    action: Transition,
  ) -> impl Future<Output = Result<CustomAssetRequest, Self::Error>> + Send + '_;

  // ── Misc documents ────────────────────────────────────────────────────

  fn get_misc(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<serde_json::Value>, Self::Error>> + Send + '_;

  fn put_misc(
    &self,
    name: String,
    data: serde_json::Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
