//! User records: the identity store's unit of data.
//!
//! An HR user owns a company: their own email is the company key, and
//! `company_name` / `company_logo` describe it. An employee points at the
//! company they are booked under through the `current_working_company_*`
//! fields. `current_employees` on an HR record is never stored; backends
//! derive it from those back-references on read.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, Error, Result};

// ─── Role ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Hr,
  Employee,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Hr => "hr",
      Self::Employee => "employee",
    }
  }
}

impl std::fmt::Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_email:                    Email,
  pub user_name:                     String,
  pub user_role:                     Role,
  pub user_image:                    Option<String>,
  pub date_of_birth:                 Option<NaiveDate>,
  /// HR only: the company this user administers.
  pub company_name:                  Option<String>,
  pub company_logo:                  Option<String>,
  pub current_working_company_email: Option<Email>,
  pub current_working_company_name:  Option<String>,
  pub current_working_company_image: Option<String>,
  #[serde(rename = "currentMemberShipLimit")]
  pub current_membership_limit:      u32,
  /// Employees booked under this HR. Always empty for employees.
  pub current_employees:             BTreeSet<Email>,
  pub created_at:                    DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to registration. Company linkage, membership limit and roster are
/// always initialised empty by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
  pub user_email:    Email,
  pub user_name:     String,
  pub user_role:     Role,
  #[serde(default)]
  pub user_image:    Option<String>,
  #[serde(default)]
  pub date_of_birth: Option<NaiveDate>,
  #[serde(default)]
  pub company_name:  Option<String>,
  #[serde(default)]
  pub company_logo:  Option<String>,
}

impl NewUser {
  pub fn new(user_email: Email, user_name: impl Into<String>, user_role: Role) -> Self {
    Self {
      user_email,
      user_name: user_name.into(),
      user_role,
      user_image: None,
      date_of_birth: None,
      company_name: None,
      company_logo: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.user_name.trim().is_empty() {
      return Err(Error::Validation("userName must not be empty".into()));
    }
    Ok(())
  }
}

/// Self-service profile changes. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
  pub user_name:     Option<String>,
  pub user_image:    Option<String>,
  pub date_of_birth: Option<NaiveDate>,
}

impl ProfileUpdate {
  pub fn is_empty(&self) -> bool {
    self.user_name.is_none() && self.user_image.is_none() && self.date_of_birth.is_none()
  }

  pub fn validate(&self) -> Result<()> {
    if self.user_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::Validation("userName must not be empty".into()));
    }
    Ok(())
  }
}
