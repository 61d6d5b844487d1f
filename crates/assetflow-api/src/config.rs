//! Runtime server configuration, deserialised from `config.toml` layered
//! under `ASSETFLOW_*` environment variables.

use std::{collections::HashMap, path::PathBuf};

use assetflow_core::{
  access::{Operation, RequiredRole},
  payment::{Package, default_packages},
  roster::RosterConfig,
  workflow::WorkflowConfig,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  /// HMAC secret for session tokens.
  pub token_secret:      String,
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours:   u32,
  /// Cross-site deployment: session cookies become `Secure; SameSite=None`.
  #[serde(default)]
  pub production:        bool,
  /// CORS allow-list. Credentials are always allowed for these origins.
  #[serde(default)]
  pub allowed_origins:   Vec<String>,
  /// Without a key, payment intents fail with a payment error.
  #[serde(default)]
  pub stripe_secret_key: Option<String>,
  #[serde(default = "default_stripe_api_base")]
  pub stripe_api_base:   String,
  /// Seeded into the `misc` collection when no package document exists.
  #[serde(default = "default_packages")]
  pub packages:          Vec<Package>,
  #[serde(default)]
  pub workflow:          WorkflowConfig,
  #[serde(default)]
  pub roster:            RosterConfig,
  /// Per-operation role overrides on top of the default policy table.
  #[serde(default)]
  pub access:            HashMap<Operation, RequiredRole>,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("assetflow.db") }

fn default_token_ttl_hours() -> u32 { 24 }

fn default_stripe_api_base() -> String { "https://api.stripe.com".into() }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_the_secret_is_required() {
    let cfg: ServerConfig =
      serde_json::from_str(r#"{"token_secret":"s3cret"}"#).unwrap();
    assert_eq!(cfg.port, 5000);
    assert_eq!(cfg.token_ttl_hours, 24);
    assert!(!cfg.production);
    assert!(cfg.roster.enforce_membership_limit);
    assert!(!cfg.workflow.reject_duplicate_pending);
    assert_eq!(cfg.packages.len(), 3);
    assert!(cfg.access.is_empty());

    assert!(serde_json::from_str::<ServerConfig>("{}").is_err());
  }

  #[test]
  fn access_overrides_use_operation_names() {
    let cfg: ServerConfig = serde_json::from_str(
      r#"{"token_secret":"s","access":{"list_team":"hr"}}"#,
    )
    .unwrap();
    assert_eq!(cfg.access.get(&Operation::ListTeam), Some(&RequiredRole::Hr));
  }
}
