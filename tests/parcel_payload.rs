use parcel_server::domain::parcel::{NewParcel, Parcel, ParcelPaymentStatus};
use serde_json::json;
use uuid::Uuid;

#[test]
fn stored_parcel_reads_back_from_wire_json() {
    let id = Uuid::new_v4();
    let parcel: Parcel = serde_json::from_value(json!({
        "_id": id.to_string(),
        "create_by": "a@x.com",
        "createdAt": "2025-03-01T10:00:00Z",
        "payment_status": "paid",
        "receiver_name": "B",
        "cost": 120
    }))
    .unwrap();

    assert_eq!(parcel.id, id);
    assert_eq!(parcel.payment_status, ParcelPaymentStatus::Paid);
    assert_eq!(parcel.fields.len(), 2);
    assert_eq!(parcel.fields["cost"], json!(120));
}

#[test]
fn blank_creator_is_not_recorded() {
    let parcel = NewParcel::from_payload(json!({"create_by": "  ", "title": "Box"})).unwrap();
    assert_eq!(parcel.created_by, None);
    assert!(!parcel.fields.contains_key("create_by"));
}

#[test]
fn unknown_status_from_storage_reads_as_unpaid() {
    assert_eq!(ParcelPaymentStatus::parse("paid"), ParcelPaymentStatus::Paid);
    assert_eq!(ParcelPaymentStatus::parse("refunded"), ParcelPaymentStatus::Unpaid);
    assert_eq!(ParcelPaymentStatus::default().as_str(), "unpaid");
}
