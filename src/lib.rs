use std::sync::Arc;

pub mod config;
pub mod domain {
    pub mod parcel;
    pub mod payment;
}
pub mod http {
    pub mod error;
    pub mod routes;
    pub mod handlers {
        pub mod intents;
        pub mod ops;
        pub mod parcels;
        pub mod payments;
    }
}
pub mod intents;
pub mod repo {
    pub mod outbox_repo;
    pub mod parcels_repo;
    pub mod payments_repo;
}
pub mod service {
    pub mod outbox_relay;
    pub mod payment_recorder;
}

#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub redis_client: redis::Client,
    pub parcels: Arc<dyn domain::parcel::ParcelStore>,
    pub payment_recorder: service::payment_recorder::PaymentRecorder,
    pub intents: Arc<dyn intents::PaymentIntentProvider>,
}
