use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Keys the server owns; client values for these are dropped on create.
const RESERVED_KEYS: [&str; 4] = ["_id", "create_by", "createdAt", "payment_status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParcelPaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl ParcelPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelPaymentStatus::Unpaid => "unpaid",
            ParcelPaymentStatus::Paid => "paid",
        }
    }

    /// Unknown values read back from storage are treated as unpaid.
    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => ParcelPaymentStatus::Paid,
            _ => ParcelPaymentStatus::Unpaid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "create_by", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub payment_status: ParcelPaymentStatus,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A parcel as submitted by a client, before the server assigns identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewParcel {
    pub created_by: Option<String>,
    pub fields: Map<String, Value>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParcelPayloadError {
    #[error("parcel payload must be a JSON object")]
    NotAnObject,
}

impl NewParcel {
    pub fn from_payload(payload: Value) -> Result<Self, ParcelPayloadError> {
        let Value::Object(mut fields) = payload else {
            return Err(ParcelPayloadError::NotAnObject);
        };

        let created_by = match fields.get("create_by") {
            Some(Value::String(email)) if !email.trim().is_empty() => Some(email.trim().to_string()),
            _ => None,
        };

        for key in RESERVED_KEYS {
            fields.remove(key);
        }

        Ok(Self { created_by, fields })
    }

    pub fn into_parcel(self, id: Uuid, created_at: DateTime<Utc>) -> Parcel {
        Parcel {
            id,
            created_by: self.created_by,
            created_at,
            payment_status: ParcelPaymentStatus::Unpaid,
            fields: self.fields,
        }
    }
}

/// Storage for parcels. `ParcelsRepo` is the Postgres implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParcelStore: Send + Sync {
    /// Newest first, optionally restricted to one creator.
    async fn list(&self, created_by: Option<String>) -> anyhow::Result<Vec<Parcel>>;

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Parcel>>;

    async fn insert(&self, parcel: NewParcel) -> anyhow::Result<Parcel>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete(&self, id: Uuid) -> anyhow::Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_keeps_client_fields_and_drops_reserved_ones() {
        let parcel = NewParcel::from_payload(json!({
            "_id": "spoofed",
            "create_by": "a@x.com",
            "payment_status": "paid",
            "createdAt": "2020-01-01T00:00:00Z",
            "title": "Books",
            "weight": 2.5
        }))
        .unwrap();

        assert_eq!(parcel.created_by.as_deref(), Some("a@x.com"));
        assert_eq!(parcel.fields.len(), 2);
        assert_eq!(parcel.fields["title"], json!("Books"));
        assert!(!parcel.fields.contains_key("payment_status"));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(
            NewParcel::from_payload(json!(["a", "b"])),
            Err(ParcelPayloadError::NotAnObject)
        );
    }

    #[test]
    fn new_parcels_start_unpaid() {
        let now = Utc::now();
        let parcel = NewParcel::from_payload(json!({"title": "Lamp"}))
            .unwrap()
            .into_parcel(Uuid::new_v4(), now);
        assert_eq!(parcel.payment_status, ParcelPaymentStatus::Unpaid);
        assert_eq!(parcel.created_by, None);
    }

    #[test]
    fn parcel_serializes_flat_with_wire_names() {
        let id = Uuid::new_v4();
        let parcel = NewParcel::from_payload(json!({"create_by": "b@x.com", "title": "Lamp"}))
            .unwrap()
            .into_parcel(id, Utc::now());

        let v = serde_json::to_value(&parcel).unwrap();
        assert_eq!(v["_id"], json!(id.to_string()));
        assert_eq!(v["create_by"], json!("b@x.com"));
        assert_eq!(v["payment_status"], json!("unpaid"));
        assert_eq!(v["title"], json!("Lamp"));
        assert!(v.get("createdAt").is_some());
        assert!(v.get("fields").is_none());
    }
}
