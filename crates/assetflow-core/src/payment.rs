//! Membership packages and the payment-intent collaborator.
//!
//! Packages live in the `misc` collection under [`PACKAGES_DOCUMENT`]. The
//! checkout itself is opaque: a [`PaymentProvider`] turns an amount into a
//! client secret that the browser completes against the provider directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, access::Caller, store::AssetStore, user::Role};

pub const CURRENCY: &str = "usd";
pub const PACKAGES_DOCUMENT: &str = "packages";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
  pub name:    String,
  /// Seats added to the membership limit.
  pub members: u32,
  /// Price in dollars.
  pub price:   f64,
}

/// The packages a fresh deployment starts with.
pub fn default_packages() -> Vec<Package> {
  vec![
    Package { name: "basic".into(), members: 5, price: 5.0 },
    Package { name: "standard".into(), members: 10, price: 8.0 },
    Package { name: "premium".into(), members: 20, price: 15.0 },
  ]
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
  pub client_secret: String,
  /// Amount in minor units (cents).
  pub amount:        u64,
  pub currency:      String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
  async fn create_intent(&self, amount_minor: u64, currency: &str) -> Result<PaymentIntent>;
}

/// Dollars to cents.
pub fn amount_minor_units(price: f64) -> Result<u64> {
  if !price.is_finite() || price <= 0.0 {
    return Err(Error::Validation(format!("invalid price: {price}")));
  }
  Ok((price * 100.0).round() as u64)
}

pub async fn load_packages<S: AssetStore>(store: &S) -> Result<Vec<Package>> {
  match store
    .get_misc(PACKAGES_DOCUMENT.to_owned())
    .await
    .map_err(Error::store)?
  {
    Some(data) => Ok(serde_json::from_value(data)?),
    None => Ok(Vec::new()),
  }
}

/// Write `packages` unless a package document already exists. Returns
/// whether anything was written.
pub async fn seed_packages<S: AssetStore>(store: &S, packages: &[Package]) -> Result<bool> {
  let existing = store
    .get_misc(PACKAGES_DOCUMENT.to_owned())
    .await
    .map_err(Error::store)?;
  if existing.is_some() {
    return Ok(false);
  }
  store
    .put_misc(PACKAGES_DOCUMENT.to_owned(), serde_json::to_value(packages)?)
    .await
    .map_err(Error::store)?;
  Ok(true)
}

pub fn find_package<'a>(packages: &'a [Package], name: &str) -> Result<&'a Package> {
  packages
    .iter()
    .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    .ok_or_else(|| Error::NotFound(format!("package {name:?}")))
}

/// Open a payment intent for `package` on behalf of the calling HR.
pub async fn create_payment_intent<S, P>(
  store: &S,
  provider: &P,
  caller: &Caller,
  package: &str,
) -> Result<PaymentIntent>
where
  S: AssetStore,
  P: PaymentProvider + ?Sized,
{
  caller.require(Role::Hr)?;
  let packages = load_packages(store).await?;
  let package = find_package(&packages, package)?;
  let amount = amount_minor_units(package.price)?;

  let intent = provider.create_intent(amount, CURRENCY).await?;
  tracing::info!(
    hr = %caller.email(),
    package = %package.name,
    amount,
    "payment intent created"
  );
  Ok(intent)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dollars_become_cents() {
    assert_eq!(amount_minor_units(5.0).unwrap(), 500);
    assert_eq!(amount_minor_units(8.99).unwrap(), 899);
    assert!(amount_minor_units(0.0).is_err());
    assert!(amount_minor_units(f64::NAN).is_err());
  }

  #[test]
  fn package_lookup_ignores_case() {
    let packages = default_packages();
    assert_eq!(find_package(&packages, "Premium").unwrap().members, 20);
    assert!(matches!(
      find_package(&packages, "platinum"),
      Err(Error::NotFound(_))
    ));
  }
}
