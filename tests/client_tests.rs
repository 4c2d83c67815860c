// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mini-app client against a live local server.

use axum::{extract::Request, middleware::Next};
use fitlog::bridge::{BridgeEvent, HapticKind, HeadlessBridge, NotificationKind};
use fitlog::client::{AuthClient, ClientError};
use fitlog::config::Config;
use fitlog::time_utils::unix_now;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{create_test_app, create_test_app_with, signed_init_data, test_db_offline};

const USER: &str = r#"{"id":42,"first_name":"A","username":"a_42"}"#;

/// Serve `app` on an ephemeral port, counting requests.
async fn spawn(app: axum::Router) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = app.layer(axum::middleware::from_fn(move |req: Request, next: Next| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            next.run(req).await
        }
    }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}

#[tokio::test]
async fn test_sign_in_success() {
    let (app, state) = create_test_app();
    let init_data = signed_init_data(&state.config, USER, unix_now());
    let (base_url, hits) = spawn(app).await;

    let bridge = Arc::new(HeadlessBridge::new(Some(init_data)));
    let client = AuthClient::new(base_url, bridge.clone());

    assert_eq!(client.optimistic_user().unwrap().id, 42);

    let response = client.sign_in().await.unwrap();
    assert!(response.is_new_user);
    assert_eq!(response.user.external_id, 42);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        bridge.events(),
        vec![BridgeEvent::Haptic(HapticKind::Notification(
            NotificationKind::Success
        ))]
    );
}

#[tokio::test]
async fn test_sign_in_rejected_is_not_retried() {
    let (app, _) = create_test_app();
    let (base_url, hits) = spawn(app).await;

    let mut other = Config::test_default();
    other.bot_token = fitlog::config::Secret::new("654321:OTHER-BOT");
    let forged = signed_init_data(&other, USER, unix_now());

    let bridge = Arc::new(HeadlessBridge::new(Some(forged)));
    let client =
        AuthClient::new(base_url, bridge.clone()).with_retry(3, Duration::from_millis(1));

    let err = client.sign_in().await.unwrap_err();
    match &err {
        ClientError::Rejected { status, code, .. } => {
            assert_eq!(*status, 401);
            assert_eq!(code, "invalid_signature");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(bridge.alerts(), vec!["Authentication failed".to_string()]);
    assert!(bridge.events().contains(&BridgeEvent::Haptic(HapticKind::Notification(
        NotificationKind::Error
    ))));
}

#[tokio::test]
async fn test_sign_in_retries_storage_failures() {
    let (app, state) = create_test_app_with(Config::test_default(), test_db_offline());
    let init_data = signed_init_data(&state.config, USER, unix_now());
    let (base_url, hits) = spawn(app).await;

    let bridge = Arc::new(HeadlessBridge::new(Some(init_data)));
    let client =
        AuthClient::new(base_url, bridge.clone()).with_retry(3, Duration::from_millis(1));

    let err = client.sign_in().await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(bridge.alerts(), vec!["Please try again".to_string()]);
}

#[tokio::test]
async fn test_sign_in_without_init_data() {
    let (app, _) = create_test_app();
    let (base_url, _) = spawn(app).await;

    let bridge = Arc::new(HeadlessBridge::new(None));
    let client = AuthClient::new(base_url, bridge.clone());

    assert!(client.optimistic_user().is_none());
    let err = client.sign_in().await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected { status: 400, .. }));
}
