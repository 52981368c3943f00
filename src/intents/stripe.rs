use crate::intents::{PaymentIntent, PaymentIntentProvider};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub struct StripeIntentProvider {
    pub base_url: String,
    pub secret_key: String,
    pub currency: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StripeIntentBody {
    id: String,
    client_secret: String,
    amount: i64,
    currency: String,
}

#[async_trait::async_trait]
impl PaymentIntentProvider for StripeIntentProvider {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_intent(&self, amount_minor: i64) -> Result<PaymentIntent> {
        let url = format!("{}/v1/payment_intents", self.base_url.trim_end_matches('/'));
        let form = intent_form(amount_minor, &self.currency);

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("payment intent provider timed out")
                } else {
                    anyhow!("payment intent request failed: {}", e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "payment intent provider returned HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            ));
        }

        let body: StripeIntentBody = resp
            .json()
            .await
            .context("decoding payment intent response")?;

        Ok(PaymentIntent {
            id: body.id,
            client_secret: body.client_secret,
            amount_minor: body.amount,
            currency: body.currency,
        })
    }
}

fn intent_form(amount_minor: i64, currency: &str) -> Vec<(&'static str, String)> {
    vec![
        ("amount", amount_minor.to_string()),
        ("currency", currency.to_string()),
        ("payment_method_types[]", "card".to_string()),
    ]
}
