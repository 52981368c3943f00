use parcel_server::domain::parcel::{NewParcel, ParcelPaymentStatus, ParcelStore};
use parcel_server::repo::parcels_repo::ParcelsRepo;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn parcel_round_trips_through_jsonb(pool: PgPool) {
    let repo = ParcelsRepo { pool };
    let new = NewParcel::from_payload(json!({
        "create_by": "a@x.com",
        "weight": 2.5,
        "receiver": {"name": "B"}
    }))
    .unwrap();

    let created = repo.insert(new).await.unwrap();
    let fetched = repo.get(created.id).await.unwrap().unwrap();

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.created_by.as_deref(), Some("a@x.com"));
    assert_eq!(fetched.payment_status, ParcelPaymentStatus::Unpaid);
    assert_eq!(fetched.fields["receiver"], json!({"name": "B"}));

    assert_eq!(repo.list(Some("a@x.com".to_string())).await.unwrap().len(), 1);
    assert!(repo.list(Some("b@x.com".to_string())).await.unwrap().is_empty());

    assert_eq!(repo.delete(created.id).await.unwrap(), 1);
    assert_eq!(repo.delete(created.id).await.unwrap(), 0);
    assert!(repo.get(created.id).await.unwrap().is_none());
}
