//! Roster / booking manager.
//!
//! Maintains the HR ↔ employee assignment graph. The graph has a single
//! source of truth, each employee's `current_working_company_email`; an HR
//! record's `current_employees` is derived from it on read, so the two sides
//! cannot drift apart.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
  Email, Error, Result,
  access::Caller,
  payment::{self, Package},
  store::AssetStore,
  user::{Role, User},
};

/// Roster switches, read from the `[roster]` config table.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
  /// Reject bookings that would take an HR past their membership limit.
  #[serde(default = "enforce_by_default")]
  pub enforce_membership_limit: bool,
}

fn enforce_by_default() -> bool { true }

impl Default for RosterConfig {
  fn default() -> Self { Self { enforce_membership_limit: true } }
}

/// Seats bought vs. seats filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipStatus {
  pub limit: u32,
  pub used:  u32,
}

impl MembershipStatus {
  pub fn of(hr: &User) -> Self {
    Self {
      limit: hr.current_membership_limit,
      used:  u32::try_from(hr.current_employees.len()).unwrap_or(u32::MAX),
    }
  }

  pub fn remaining(&self) -> u32 { self.limit.saturating_sub(self.used) }
}

pub struct Roster<S> {
  store:  Arc<S>,
  config: RosterConfig,
}

impl<S> Clone for Roster<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), config: self.config.clone() }
  }
}

impl<S: AssetStore> Roster<S> {
  pub fn new(store: Arc<S>, config: RosterConfig) -> Self { Self { store, config } }

  /// Book every email in `employees` under the calling HR.
  pub async fn book(&self, caller: &Caller, employees: Vec<Email>) -> Result<User> {
    caller.require(Role::Hr)?;
    if employees.is_empty() {
      return Err(Error::Validation("no employees to book".into()));
    }
    let count = employees.len();

    let hr = self
      .store
      .book_employees(
        caller.email().clone(),
        employees,
        self.config.enforce_membership_limit,
      )
      .await
      .map_err(Error::store)?;

    let status = MembershipStatus::of(&hr);
    tracing::info!(
      hr = %hr.user_email,
      requested = count,
      used = status.used,
      remaining = status.remaining(),
      "employees booked"
    );
    Ok(hr)
  }

  /// Remove `employee` from the calling HR's roster. Unbooking someone who
  /// is not on the roster changes nothing and is not an error.
  pub async fn unbook(&self, caller: &Caller, employee: Email) -> Result<User> {
    caller.require(Role::Hr)?;
    let hr = self
      .store
      .unbook_employee(caller.email().clone(), employee.clone())
      .await
      .map_err(Error::store)?;
    tracing::info!(hr = %hr.user_email, %employee, "employee unbooked");
    Ok(hr)
  }

  pub fn membership_check(&self, caller: &Caller) -> Result<MembershipStatus> {
    caller.require(Role::Hr)?;
    Ok(MembershipStatus::of(&caller.user))
  }

  /// Employees free to be booked.
  pub async fn list_unaffiliated(&self, caller: &Caller) -> Result<Vec<User>> {
    caller.require(Role::Hr)?;
    self
      .store
      .list_unaffiliated_employees()
      .await
      .map_err(Error::store)
  }

  /// Everyone booked under the caller's company. Unscoped callers get an
  /// empty list.
  pub async fn list_team(&self, caller: &Caller) -> Result<Vec<User>> {
    let Some(company) = caller.scope() else {
      return Ok(Vec::new());
    };
    self
      .store
      .list_company_members(company.clone())
      .await
      .map_err(Error::store)
  }

  /// Credit a purchased package to the calling HR's membership limit.
  ///
  /// Payment is not checked here; the caller is trusted to have confirmed
  /// checkout with the payment provider first.
  pub async fn purchase_membership(&self, caller: &Caller, package: &str) -> Result<User> {
    caller.require(Role::Hr)?;
    let packages = payment::load_packages(self.store.as_ref()).await?;
    let Package { name, members, .. } = payment::find_package(&packages, package)?;

    let hr = self
      .store
      .add_membership_limit(caller.email().clone(), *members)
      .await
      .map_err(Error::store)?;
    tracing::info!(
      hr = %hr.user_email,
      package = %name,
      limit = hr.current_membership_limit,
      "membership purchased"
    );
    Ok(hr)
  }
}
