use parcel_server::config::AppConfig;
use parcel_server::http::routes::build_router;
use parcel_server::intents::mock::MockIntentProvider;
use parcel_server::intents::stripe::StripeIntentProvider;
use parcel_server::intents::PaymentIntentProvider;
use parcel_server::repo::outbox_repo::OutboxRepo;
use parcel_server::repo::parcels_repo::ParcelsRepo;
use parcel_server::repo::payments_repo::PaymentsRepo;
use parcel_server::service::outbox_relay::OutboxRelay;
use parcel_server::service::payment_recorder::PaymentRecorder;
use parcel_server::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_max_connections)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database connected and migrated");

    let redis_client = redis::Client::open(cfg.redis_url.clone())?;

    let parcels_repo = ParcelsRepo { pool: pool.clone() };
    let payments_repo = PaymentsRepo { pool: pool.clone() };
    let outbox_repo = OutboxRepo { pool: pool.clone() };

    let intents: Arc<dyn PaymentIntentProvider> = match cfg.stripe_secret_key.clone() {
        Some(secret_key) => Arc::new(StripeIntentProvider {
            base_url: cfg.stripe_base_url.clone(),
            secret_key,
            currency: cfg.intent_currency.clone(),
            timeout_ms: cfg.intent_timeout_ms,
            client: reqwest::Client::new(),
        }),
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set; payment intents are mocked");
            Arc::new(MockIntentProvider {
                currency: cfg.intent_currency.clone(),
            })
        }
    };

    let relay = OutboxRelay {
        outbox_repo,
        redis_client: redis_client.clone(),
        stream_key: cfg.stream_key.clone(),
    };
    tokio::spawn(relay.run());

    let state = AppState {
        pool,
        redis_client,
        parcels: Arc::new(parcels_repo),
        payment_recorder: PaymentRecorder::new(Arc::new(payments_repo)),
        intents,
    };

    let app = build_router(state, &cfg.cors_allowed_origins);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
