use crate::intents::{PaymentIntent, PaymentIntentProvider};
use anyhow::Result;

/// Offline provider used when no secret key is configured.
pub struct MockIntentProvider {
    pub currency: String,
}

#[async_trait::async_trait]
impl PaymentIntentProvider for MockIntentProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_intent(&self, amount_minor: i64) -> Result<PaymentIntent> {
        let id = format!("pi_mock_{}", uuid::Uuid::new_v4().simple());
        Ok(PaymentIntent {
            client_secret: format!("{}_secret_{}", id, uuid::Uuid::new_v4().simple()),
            id,
            amount_minor,
            currency: self.currency.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn secret_embeds_intent_id() {
        let provider = MockIntentProvider {
            currency: "usd".to_string(),
        };
        let intent = provider.create_intent(1250).await.unwrap();
        assert!(intent.client_secret.starts_with(&format!("{}_secret_", intent.id)));
        assert_eq!(intent.amount_minor, 1250);
        assert_eq!(intent.currency, "usd");
    }
}
