//! Payment-intent providers: Stripe over HTTPS, and a stand-in for
//! deployments without a key.

use assetflow_core::{
  Error, Result,
  payment::{PaymentIntent, PaymentProvider},
};
use async_trait::async_trait;
use serde::Deserialize;

pub struct StripeProvider {
  client:     reqwest::Client,
  api_base:   String,
  secret_key: String,
}

impl StripeProvider {
  pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
    Self {
      client:     reqwest::Client::new(),
      api_base:   api_base.into(),
      secret_key: secret_key.into(),
    }
  }
}

#[derive(Deserialize)]
struct StripeIntent {
  client_secret: String,
  amount:        u64,
  currency:      String,
}

#[async_trait]
impl PaymentProvider for StripeProvider {
  async fn create_intent(&self, amount_minor: u64, currency: &str) -> Result<PaymentIntent> {
    let url = format!("{}/v1/payment_intents", self.api_base.trim_end_matches('/'));
    let response = self
      .client
      .post(url)
      .bearer_auth(&self.secret_key)
      .form(&[
        ("amount", amount_minor.to_string()),
        ("currency", currency.to_owned()),
        ("payment_method_types[]", "card".to_owned()),
      ])
      .send()
      .await
      .map_err(|e| Error::Payment(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      tracing::warn!(%status, body, "payment provider rejected intent");
      return Err(Error::Payment(format!("provider returned {status}")));
    }

    let intent: StripeIntent = response
      .json()
      .await
      .map_err(|e| Error::Payment(format!("unreadable provider response: {e}")))?;

    Ok(PaymentIntent {
      client_secret: intent.client_secret,
      amount:        intent.amount,
      currency:      intent.currency,
    })
  }
}

/// Used when no Stripe key is configured.
pub struct DisabledProvider;

#[async_trait]
impl PaymentProvider for DisabledProvider {
  async fn create_intent(&self, _amount_minor: u64, _currency: &str) -> Result<PaymentIntent> {
    Err(Error::Payment("payments are not configured".into()))
  }
}
