use crate::domain::parcel::ParcelPaymentStatus;
use crate::domain::payment::{
    LedgerOutcome, NewPaymentRecord, PaymentLedger, PaymentRecord, PaymentRecordedEvent,
};
use crate::repo::outbox_repo::OutboxRepo;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

pub const PAYMENT_RECORDED_EVENT: &str = "payment.recorded";

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

impl PaymentsRepo {
    pub async fn find_by_transaction_id(&self, transaction_id: &str) -> anyhow::Result<Option<PaymentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, parcel_id, user_email, transaction_id, payment_method, amount, paid_at_string, paid_at
            FROM payments
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(to_record))
    }

    /// Inserts the ledger row unless its transaction id is already present.
    /// Returns false on a duplicate.
    pub async fn insert_payment_tx(
        tx: &mut Transaction<'_, Postgres>,
        record: &PaymentRecord,
    ) -> anyhow::Result<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO payments (
                id, parcel_id, user_email, transaction_id, payment_method, amount, paid_at_string, paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (transaction_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(record.id)
        .bind(&record.parcel_id)
        .bind(&record.user_email)
        .bind(&record.transaction_id)
        .bind(record.payment_method.clone())
        .bind(record.amount)
        .bind(&record.paid_at_string)
        .bind(record.paid_at)
        .fetch_optional(tx.as_mut())
        .await?;

        Ok(inserted.is_some())
    }

    pub async fn mark_parcel_paid_tx(
        tx: &mut Transaction<'_, Postgres>,
        parcel_id: Uuid,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query("UPDATE parcels SET payment_status = $2 WHERE id = $1 AND payment_status <> $2")
            .bind(parcel_id)
            .bind(ParcelPaymentStatus::Paid.as_str())
            .execute(tx.as_mut())
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PaymentLedger for PaymentsRepo {
    async fn record(&self, entry: NewPaymentRecord) -> anyhow::Result<LedgerOutcome> {
        let mut tx = self.pool.begin().await?;

        if !Self::insert_payment_tx(&mut tx, &entry.record).await? {
            tx.rollback().await?;
            let existing = self
                .find_by_transaction_id(&entry.record.transaction_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("conflicting payment row vanished"))?;
            return Ok(LedgerOutcome::Duplicate(existing));
        }

        let parcels_updated = match entry.parcel_ref {
            Some(parcel_id) => Self::mark_parcel_paid_tx(&mut tx, parcel_id).await?,
            None => 0,
        };

        let event = PaymentRecordedEvent::new(&entry.record, parcels_updated);
        OutboxRepo::insert_tx(
            &mut tx,
            entry.record.id,
            PAYMENT_RECORDED_EVENT,
            serde_json::to_value(event)?,
        )
        .await?;

        tx.commit().await?;

        Ok(LedgerOutcome::Recorded {
            payment_id: entry.record.id,
            parcels_updated,
        })
    }

    async fn list(&self, user_email: Option<String>) -> anyhow::Result<Vec<PaymentRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, parcel_id, user_email, transaction_id, payment_method, amount, paid_at_string, paid_at
            FROM payments
            WHERE ($1::text IS NULL OR user_email = $1)
            ORDER BY paid_at DESC
            "#,
        )
        .bind(user_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(to_record).collect())
    }
}

fn to_record(r: PgRow) -> PaymentRecord {
    PaymentRecord {
        id: r.get("id"),
        parcel_id: r.get("parcel_id"),
        user_email: r.get("user_email"),
        transaction_id: r.get("transaction_id"),
        payment_method: r.get("payment_method"),
        amount: r.get("amount"),
        paid_at_string: r.get("paid_at_string"),
        paid_at: r.get("paid_at"),
    }
}
