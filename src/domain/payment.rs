use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /payments`. Every field is optional here so that absence
/// is reported as a missing field instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecordPaymentRequest {
    #[serde(default)]
    pub parcel_id: Option<String>,
    #[serde(rename = "userEmail", default)]
    pub user_email: Option<String>,
    #[serde(rename = "transactionId", default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(rename = "paymentMethod", default)]
    pub payment_method: Option<String>,
}

/// A request that passed boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfirmation {
    pub parcel_id: String,
    pub user_email: String,
    pub transaction_id: String,
    pub amount: Decimal,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPaymentResponse {
    pub message: String,
    pub updated: u64,
    #[serde(rename = "paymentId")]
    pub payment_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub parcel_id: String,
    #[serde(rename = "userEmail")]
    pub user_email: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(rename = "paymentMethod", default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub paid_at_string: String,
    pub paid_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Stamps a fresh ledger entry for `confirmation` at `paid_at`.
    pub fn from_confirmation(confirmation: &PaymentConfirmation, paid_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            parcel_id: confirmation.parcel_id.clone(),
            user_email: confirmation.user_email.clone(),
            transaction_id: confirmation.transaction_id.clone(),
            payment_method: confirmation.payment_method.clone(),
            amount: confirmation.amount,
            paid_at_string: paid_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            paid_at,
        }
    }

    /// Whether this stored entry describes the same payment as `confirmation`.
    pub fn matches(&self, confirmation: &PaymentConfirmation) -> bool {
        self.transaction_id == confirmation.transaction_id
            && self.parcel_id == confirmation.parcel_id
            && self.user_email == confirmation.user_email
            && self.amount == confirmation.amount
    }
}

/// Everything the ledger needs to write for one confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaymentRecord {
    pub record: PaymentRecord,
    /// Parsed parcel id; `None` when `record.parcel_id` cannot name a parcel.
    pub parcel_ref: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerOutcome {
    Recorded { payment_id: Uuid, parcels_updated: u64 },
    /// The transaction id was already on file; nothing was written.
    Duplicate(PaymentRecord),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecordedEvent {
    pub payment_id: Uuid,
    pub parcel_id: String,
    pub user_email: String,
    pub transaction_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub parcels_updated: u64,
    pub recorded_at: DateTime<Utc>,
}

impl PaymentRecordedEvent {
    pub fn new(record: &PaymentRecord, parcels_updated: u64) -> Self {
        Self {
            payment_id: record.id,
            parcel_id: record.parcel_id.clone(),
            user_email: record.user_email.clone(),
            transaction_id: record.transaction_id.clone(),
            amount: record.amount,
            parcels_updated,
            recorded_at: record.paid_at,
        }
    }
}

/// Append-only payment ledger. `record` must apply the payment insert and
/// the parcel status change together or not at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    async fn record(&self, entry: NewPaymentRecord) -> anyhow::Result<LedgerOutcome>;

    /// Newest first, optionally restricted to one payer.
    async fn list(&self, user_email: Option<String>) -> anyhow::Result<Vec<PaymentRecord>>;
}
