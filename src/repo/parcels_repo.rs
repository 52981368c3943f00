use crate::domain::parcel::{NewParcel, Parcel, ParcelPaymentStatus, ParcelStore};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct ParcelsRepo {
    pub pool: PgPool,
}

#[async_trait]
impl ParcelStore for ParcelsRepo {
    async fn list(&self, created_by: Option<String>) -> anyhow::Result<Vec<Parcel>> {
        let rows = sqlx::query(
            r#"
            SELECT id, created_by, created_at, payment_status, fields
            FROM parcels
            WHERE ($1::text IS NULL OR created_by = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(to_parcel).collect())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Parcel>> {
        let row = sqlx::query(
            "SELECT id, created_by, created_at, payment_status, fields FROM parcels WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(to_parcel))
    }

    async fn insert(&self, parcel: NewParcel) -> anyhow::Result<Parcel> {
        let parcel = parcel.into_parcel(Uuid::new_v4(), chrono::Utc::now());

        sqlx::query(
            r#"
            INSERT INTO parcels (id, created_by, created_at, payment_status, fields)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(parcel.id)
        .bind(parcel.created_by.clone())
        .bind(parcel.created_at)
        .bind(parcel.payment_status.as_str())
        .bind(Value::Object(parcel.fields.clone()))
        .execute(&self.pool)
        .await?;

        Ok(parcel)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM parcels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn to_parcel(r: PgRow) -> Parcel {
    let status: String = r.get("payment_status");
    let fields = match r.get::<Value, _>("fields") {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    Parcel {
        id: r.get("id"),
        created_by: r.get("created_by"),
        created_at: r.get("created_at"),
        payment_status: ParcelPaymentStatus::parse(&status),
        fields,
    }
}
