use std::sync::Arc;

use axum::extract::State;
use printshop_api::{
    config::AppConfig, routes::health::health_check, state::AppState, store::MemoryStore,
};

#[tokio::test]
async fn health_check_returns_ok() {
    let state = AppState::new(Arc::new(MemoryStore::new()), AppConfig::for_tests("secret"));
    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = serde_json::to_value(response.0.data.expect("health data")).expect("json");
    assert_eq!(data["status"], "ok");
    assert_eq!(data["store"], "memory");
}
