// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fitlog::config::Config;
use fitlog::db::{Database, MemoryStore};
use fitlog::init_data::InitDataVerifier;
use fitlog::middleware::auth::create_jwt;
use fitlog::routes::create_router;
use fitlog::time_utils::unix_now;
use fitlog::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> fitlog::db::FirestoreStore {
    fitlog::db::FirestoreStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> Database {
    Database::new_mock()
}

/// Build a router around `config` and `db`.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config, db: Database) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, db).expect("Failed to build app state"));
    (create_router(state.clone()), state)
}

/// Create a test app backed by in-memory storage.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(
        Config::test_default(),
        Database::from_memory(MemoryStore::new()),
    )
}

/// Session token accepted by the test app.
#[allow(dead_code)]
pub fn create_test_jwt(telegram_id: i64, signing_key: &[u8]) -> String {
    let now = unix_now();
    create_jwt(telegram_id, signing_key, now, now + 86400).expect("Failed to create JWT")
}

/// Signed init data for `user_json`, issued at `auth_date`.
#[allow(dead_code)]
pub fn signed_init_data(config: &Config, user_json: &str, auth_date: i64) -> String {
    let verifier = InitDataVerifier::new(&config.bot_token, config.init_data_max_age_secs)
        .expect("Failed to build verifier");
    let auth_date = auth_date.to_string();
    verifier.sign(&[
        ("query_id", "AAHdF6IQAAAAAN0XohDhrOrc"),
        ("user", user_json),
        ("auth_date", &auth_date),
    ])
}

/// JSON body for `POST /auth/telegram`.
#[allow(dead_code)]
pub fn login_body(init_data: &str) -> String {
    serde_json::json!({ "initData": init_data }).to_string()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
