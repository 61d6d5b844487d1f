//! Access control layer.
//!
//! Every protected operation passes three gates, in order:
//!
//! 1. the session token has already been verified by the transport, yielding
//!    the claimed email;
//! 2. the email the caller declared in the call's own parameters must equal
//!    the claimed one, otherwise the call is `Unauthenticated` (a valid token
//!    for A cannot read B's data by editing a query parameter);
//! 3. the claimed user's role must satisfy the operation's entry in the
//!    [`AccessPolicy`] table, otherwise the call is `Forbidden`.
//!
//! On success the full [`User`] record is handed downstream as a [`Caller`]
//! so no later step needs to look it up again.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  Email, Error, Result,
  scope::{request_scope, scoping_email},
  store::{AssetStore, RequestScope},
  user::{Role, User},
};

// ─── Roles and operations ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredRole {
  Hr,
  Employee,
  Either,
}

impl RequiredRole {
  pub fn admits(self, role: Role) -> bool {
    match self {
      Self::Hr => role == Role::Hr,
      Self::Employee => role == Role::Employee,
      Self::Either => true,
    }
  }
}

/// Every protected operation the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
  Profile,
  UpdateProfile,
  ListUnaffiliated,
  ListTeam,
  BookEmployees,
  UnbookEmployee,
  MembershipCheck,
  PurchaseMembership,
  CreatePaymentIntent,
  ListProducts,
  GetProduct,
  AddProduct,
  UpdateProduct,
  DeleteProduct,
  RequestAsset,
  ListRequests,
  ApproveRequest,
  RejectRequest,
  ReturnRequest,
  RequestCustomAsset,
  ListCustomRequests,
  ApproveCustomRequest,
  RejectCustomRequest,
}

/// The role each operation requires out of the box.
pub const DEFAULT_POLICY: &[(Operation, RequiredRole)] = &[
  (Operation::Profile, RequiredRole::Either),
  (Operation::UpdateProfile, RequiredRole::Either),
  (Operation::ListUnaffiliated, RequiredRole::Hr),
  (Operation::ListTeam, RequiredRole::Either),
  (Operation::BookEmployees, RequiredRole::Hr),
  (Operation::UnbookEmployee, RequiredRole::Hr),
  (Operation::MembershipCheck, RequiredRole::Hr),
  (Operation::PurchaseMembership, RequiredRole::Hr),
  (Operation::CreatePaymentIntent, RequiredRole::Hr),
  (Operation::ListProducts, RequiredRole::Either),
  (Operation::GetProduct, RequiredRole::Either),
  (Operation::AddProduct, RequiredRole::Hr),
  (Operation::UpdateProduct, RequiredRole::Hr),
  (Operation::DeleteProduct, RequiredRole::Hr),
  (Operation::RequestAsset, RequiredRole::Employee),
  (Operation::ListRequests, RequiredRole::Either),
  (Operation::ApproveRequest, RequiredRole::Hr),
  (Operation::RejectRequest, RequiredRole::Hr),
  (Operation::ReturnRequest, RequiredRole::Employee),
  (Operation::RequestCustomAsset, RequiredRole::Employee),
  (Operation::ListCustomRequests, RequiredRole::Either),
  (Operation::ApproveCustomRequest, RequiredRole::Hr),
  (Operation::RejectCustomRequest, RequiredRole::Hr),
];

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Operation → required role table.
///
/// Overrides can only narrow what the workflow itself accepts: the engines
/// re-check the role their semantics need (e.g. only HR can approve), so
/// widening an entry yields `Forbidden` one step later instead of access.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
  table: HashMap<Operation, RequiredRole>,
}

impl Default for AccessPolicy {
  fn default() -> Self {
    Self { table: DEFAULT_POLICY.iter().copied().collect() }
  }
}

impl AccessPolicy {
  pub fn with_overrides(
    overrides: impl IntoIterator<Item = (Operation, RequiredRole)>,
  ) -> Self {
    let mut policy = Self::default();
    policy.table.extend(overrides);
    policy
  }

  pub fn required_role(&self, op: Operation) -> RequiredRole {
    // Every operation is seeded from DEFAULT_POLICY; the fallback only
    // matters if a variant is added without a table entry.
    self.table.get(&op).copied().unwrap_or(RequiredRole::Hr)
  }

  /// Run the self-consistency and role gates for `op`.
  ///
  /// `claimed` is the email decoded from a verified session token; `declared`
  /// is the raw email the caller put in the query string or body.
  pub async fn authorize<S: AssetStore>(
    &self,
    store: &S,
    op: Operation,
    claimed: &Email,
    declared: &str,
  ) -> Result<Caller> {
    match Email::parse(declared) {
      Ok(declared) if &declared == claimed => {}
      _ => {
        tracing::debug!(?op, %claimed, declared, "declared email does not match session");
        return Err(Error::Unauthenticated);
      }
    }

    let user = store
      .get_user(claimed.clone())
      .await
      .map_err(Error::store)?
      .ok_or_else(|| {
        tracing::debug!(?op, %claimed, "session for unregistered user");
        Error::Forbidden
      })?;

    let required = self.required_role(op);
    if !required.admits(user.user_role) {
      tracing::debug!(?op, %claimed, role = %user.user_role, ?required, "role rejected");
      return Err(Error::Forbidden);
    }

    Ok(Caller { user })
  }
}

// ─── Caller ──────────────────────────────────────────────────────────────────

/// An authenticated, role-checked caller.
#[derive(Debug, Clone)]
pub struct Caller {
  pub user: User,
}

impl Caller {
  pub fn new(user: User) -> Self { Self { user } }

  pub fn email(&self) -> &Email { &self.user.user_email }

  pub fn scope(&self) -> Option<&Email> { scoping_email(&self.user) }

  pub fn request_scope(&self) -> Option<RequestScope> { request_scope(&self.user) }

  /// Fail with `Forbidden` unless the caller holds `role`.
  pub fn require(&self, role: Role) -> Result<()> {
    if self.user.user_role == role { Ok(()) } else { Err(Error::Forbidden) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_operation_has_a_default_entry() {
    let policy = AccessPolicy::default();
    assert_eq!(policy.table.len(), DEFAULT_POLICY.len());
    assert_eq!(policy.required_role(Operation::ApproveRequest), RequiredRole::Hr);
    assert_eq!(policy.required_role(Operation::ReturnRequest), RequiredRole::Employee);
    assert_eq!(policy.required_role(Operation::ListProducts), RequiredRole::Either);
  }

  #[test]
  fn overrides_replace_defaults() {
    let policy =
      AccessPolicy::with_overrides([(Operation::ListTeam, RequiredRole::Hr)]);
    assert_eq!(policy.required_role(Operation::ListTeam), RequiredRole::Hr);
    assert_eq!(policy.required_role(Operation::Profile), RequiredRole::Either);
  }

  #[test]
  fn required_role_admission() {
    assert!(RequiredRole::Either.admits(Role::Hr));
    assert!(RequiredRole::Either.admits(Role::Employee));
    assert!(RequiredRole::Hr.admits(Role::Hr));
    assert!(!RequiredRole::Hr.admits(Role::Employee));
    assert!(!RequiredRole::Employee.admits(Role::Hr));
  }

  #[test]
  fn operations_deserialise_from_snake_case() {
    let op: Operation = serde_json::from_str("\"approve_custom_request\"").unwrap();
    assert_eq!(op, Operation::ApproveCustomRequest);
  }
}
