//! Normalised email addresses.
//!
//! Emails are both the identity key for users and the scoping key for assets
//! and requests. They are trimmed and lowercased on construction, so every
//! comparison in the system is case-insensitive.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
  pub fn parse(raw: &str) -> Result<Self> {
    let normalised = raw.trim().to_lowercase();
    match normalised.split_once('@') {
      Some((local, domain))
        if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
      {
        Ok(Self(normalised))
      }
      _ => Err(Error::Validation(format!("invalid email address: {raw:?}"))),
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Email {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for Email {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for Email {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<Email> for String {
  fn from(e: Email) -> Self { e.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_normalises_case_and_whitespace() {
    let e = Email::parse("  Alice@Example.COM ").unwrap();
    assert_eq!(e.as_str(), "alice@example.com");
    assert_eq!(e, Email::parse("alice@example.com").unwrap());
  }

  #[test]
  fn parse_rejects_malformed() {
    for raw in ["", "alice", "@example.com", "alice@", "a@b@c"] {
      assert!(
        matches!(Email::parse(raw), Err(Error::Validation(_))),
        "{raw:?} should be rejected"
      );
    }
  }

  #[test]
  fn deserialises_through_normalisation() {
    let e: Email = serde_json::from_str("\"HR@Co.com\"").unwrap();
    assert_eq!(e.as_str(), "hr@co.com");
    assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
  }
}
