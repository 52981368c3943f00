use parcel_server::domain::payment::{PaymentRecord, RecordPaymentRequest};
use parcel_server::service::payment_recorder::{validate_request, RecordPaymentError};
use rust_decimal_macros::dec;

fn scenario() -> RecordPaymentRequest {
    serde_json::from_value(serde_json::json!({
        "parcel_id": "P1",
        "userEmail": "a@x.com",
        "transactionId": "T1",
        "amount": 500
    }))
    .unwrap()
}

#[test]
fn complete_payload_validates() {
    let confirmation = validate_request(scenario()).unwrap();
    assert_eq!(confirmation.parcel_id, "P1");
    assert_eq!(confirmation.user_email, "a@x.com");
    assert_eq!(confirmation.transaction_id, "T1");
    assert_eq!(confirmation.amount, dec!(500));
    assert_eq!(confirmation.payment_method, None);
}

#[test]
fn each_required_field_is_enforced() {
    let strip: [fn(&mut RecordPaymentRequest); 4] = [
        |r| r.parcel_id = None,
        |r| r.user_email = None,
        |r| r.transaction_id = None,
        |r| r.amount = None,
    ];

    for remove in strip {
        let mut req = scenario();
        remove(&mut req);
        assert!(matches!(validate_request(req), Err(RecordPaymentError::MissingFields)));
    }
}

#[test]
fn null_and_empty_values_count_as_missing() {
    let req: RecordPaymentRequest = serde_json::from_value(serde_json::json!({
        "parcel_id": "",
        "userEmail": "a@x.com",
        "transactionId": "T1",
        "amount": null
    }))
    .unwrap();
    assert!(matches!(validate_request(req), Err(RecordPaymentError::MissingFields)));
}

#[test]
fn fractional_amount_is_kept_exactly() {
    let req: RecordPaymentRequest = serde_json::from_value(serde_json::json!({
        "parcel_id": "P1",
        "userEmail": "a@x.com",
        "transactionId": "T1",
        "amount": "12.34",
        "paymentMethod": "card"
    }))
    .unwrap();

    let confirmation = validate_request(req).unwrap();
    assert_eq!(confirmation.amount, dec!(12.34));

    let record = PaymentRecord::from_confirmation(&confirmation, chrono::Utc::now());
    assert_eq!(record.amount, dec!(12.34));
    assert_eq!(record.payment_method.as_deref(), Some("card"));
    assert!(record.matches(&confirmation));
}

#[test]
fn each_confirmation_gets_a_fresh_record_id() {
    let confirmation = validate_request(scenario()).unwrap();
    let now = chrono::Utc::now();
    let a = PaymentRecord::from_confirmation(&confirmation, now);
    let b = PaymentRecord::from_confirmation(&confirmation, now);
    assert_ne!(a.id, b.id);
}
