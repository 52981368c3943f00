use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod mock;
pub mod stripe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Body of `POST /create-payment-intent`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntentRequest {
    #[serde(rename = "amountInCents", default)]
    pub amount_in_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateIntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

/// A third-party provider that reserves a charge and hands back the
/// client secret the browser needs to confirm it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentIntentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_intent(&self, amount_minor: i64) -> Result<PaymentIntent>;
}
