use crate::domain::payment::{
    LedgerOutcome, NewPaymentRecord, PaymentConfirmation, PaymentLedger, PaymentRecord,
    RecordPaymentRequest, RecordPaymentResponse,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub const RECORDED_MESSAGE: &str = "Payment recorded successfully";
pub const REPLAYED_MESSAGE: &str = "Payment already recorded";

/// Matches the `NUMERIC(18, 4)` ledger column.
pub const AMOUNT_MAX_SCALE: u32 = 4;
const AMOUNT_MAX_INTEGER_DIGITS: u32 = 14;

#[derive(Debug, thiserror::Error)]
pub enum RecordPaymentError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid amount")]
    InvalidAmount,
    #[error("Transaction id already used for a different payment")]
    TransactionConflict,
    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct PaymentRecorder {
    pub ledger: Arc<dyn PaymentLedger>,
}

impl PaymentRecorder {
    pub fn new(ledger: Arc<dyn PaymentLedger>) -> Self {
        Self { ledger }
    }

    pub async fn record(
        &self,
        req: RecordPaymentRequest,
    ) -> Result<RecordPaymentResponse, RecordPaymentError> {
        let confirmation = validate_request(req)?;
        let record = PaymentRecord::from_confirmation(&confirmation, chrono::Utc::now());
        let entry = NewPaymentRecord {
            parcel_ref: Uuid::parse_str(&confirmation.parcel_id).ok(),
            record,
        };

        match self.ledger.record(entry).await? {
            LedgerOutcome::Recorded {
                payment_id,
                parcels_updated,
            } => {
                if parcels_updated == 0 {
                    tracing::warn!(
                        parcel_id = %confirmation.parcel_id,
                        %payment_id,
                        "payment recorded without a parcel status change"
                    );
                }
                tracing::info!(
                    %payment_id,
                    transaction_id = %confirmation.transaction_id,
                    updated = parcels_updated,
                    "payment recorded"
                );
                Ok(RecordPaymentResponse {
                    message: RECORDED_MESSAGE.to_string(),
                    updated: parcels_updated,
                    payment_id,
                })
            }
            LedgerOutcome::Duplicate(existing) => {
                if !existing.matches(&confirmation) {
                    tracing::warn!(
                        transaction_id = %confirmation.transaction_id,
                        existing_payment_id = %existing.id,
                        "transaction id reused with a different payload"
                    );
                    return Err(RecordPaymentError::TransactionConflict);
                }
                tracing::info!(
                    payment_id = %existing.id,
                    transaction_id = %confirmation.transaction_id,
                    "duplicate payment confirmation ignored"
                );
                Ok(RecordPaymentResponse {
                    message: REPLAYED_MESSAGE.to_string(),
                    updated: 0,
                    payment_id: existing.id,
                })
            }
        }
    }

    pub async fn history(&self, user_email: Option<String>) -> anyhow::Result<Vec<PaymentRecord>> {
        let filter = user_email.filter(|e| !e.trim().is_empty());
        self.ledger.list(filter).await
    }
}

/// Checks presence of the required fields before anything is written.
/// Blank strings and a zero amount count as absent.
pub fn validate_request(req: RecordPaymentRequest) -> Result<PaymentConfirmation, RecordPaymentError> {
    let parcel_id = required(req.parcel_id);
    let user_email = required(req.user_email);
    let transaction_id = required(req.transaction_id);
    let amount = req.amount.filter(|a| !a.is_zero());

    let (Some(parcel_id), Some(user_email), Some(transaction_id), Some(amount)) =
        (parcel_id, user_email, transaction_id, amount)
    else {
        return Err(RecordPaymentError::MissingFields);
    };

    if !amount_fits_ledger(amount) {
        return Err(RecordPaymentError::InvalidAmount);
    }

    Ok(PaymentConfirmation {
        parcel_id,
        user_email,
        transaction_id,
        amount: amount.normalize(),
        payment_method: required(req.payment_method),
    })
}

/// Positive, at most four decimal places, and below 10^14 so the ledger
/// column stores it without rounding or overflow.
pub fn amount_fits_ledger(amount: Decimal) -> bool {
    let amount = amount.normalize();
    amount > Decimal::ZERO
        && amount.scale() <= AMOUNT_MAX_SCALE
        && amount < Decimal::from(10_i64.pow(AMOUNT_MAX_INTEGER_DIGITS))
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
