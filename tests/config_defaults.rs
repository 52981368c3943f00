use parcel_server::config::AppConfig;
use std::collections::HashMap;

fn config(vars: &[(&str, &str)]) -> AppConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_listen_on_port_2100_with_open_cors() {
    let cfg = config(&[]);
    assert_eq!(cfg.bind_addr, "0.0.0.0:2100");
    assert_eq!(cfg.cors_allowed_origins, vec!["*".to_string()]);
    assert_eq!(cfg.db_max_connections, 10);
    assert!(cfg.stripe_secret_key.is_none());
    assert_eq!(cfg.intent_timeout_ms, 2500);
}

#[test]
fn port_feeds_bind_addr_unless_overridden() {
    assert_eq!(config(&[("PORT", "8080")]).bind_addr, "0.0.0.0:8080");
    assert_eq!(
        config(&[("PORT", "8080"), ("BIND_ADDR", "127.0.0.1:9000")]).bind_addr,
        "127.0.0.1:9000"
    );
}

#[test]
fn cors_origins_are_split_and_trimmed() {
    let cfg = config(&[("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example ,")]);
    assert_eq!(
        cfg.cors_allowed_origins,
        vec!["https://a.example".to_string(), "https://b.example".to_string()]
    );
}

#[test]
fn blank_secret_key_means_mock_provider() {
    assert!(config(&[("STRIPE_SECRET_KEY", " ")]).stripe_secret_key.is_none());
    assert_eq!(
        config(&[("STRIPE_SECRET_KEY", "sk_test_1")]).stripe_secret_key.as_deref(),
        Some("sk_test_1")
    );
}

#[test]
fn unparsable_numbers_fall_back_to_defaults() {
    let cfg = config(&[("DB_MAX_CONNECTIONS", "lots"), ("PAYMENT_INTENT_TIMEOUT_MS", "-1")]);
    assert_eq!(cfg.db_max_connections, 10);
    assert_eq!(cfg.intent_timeout_ms, 2500);
}
