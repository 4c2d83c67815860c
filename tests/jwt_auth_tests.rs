// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication tests.
//!
//! These tests verify that session tokens minted at login can be decoded
//! by the auth middleware, catching compatibility issues early.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fitlog::middleware::auth::{create_jwt, decode_session, SESSION_COOKIE};
use fitlog::time_utils::unix_now;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

mod common;

/// Claims structure that must match what the middleware expects.
/// This is the canonical format - if either create_jwt or the middleware
/// changes, this test should catch the incompatibility.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    iat: i64,
}

const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

#[test]
fn test_jwt_claims_format() {
    let now = unix_now();
    let token = create_jwt(279058397, KEY, now, now + 86400 * 30).unwrap();

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(KEY),
        &Validation::new(Algorithm::HS256),
    )
    .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, "279058397");
    assert_eq!(token_data.claims.iat, now);
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_jwt_non_numeric_subject_rejected() {
    let now = unix_now();
    let claims = Claims {
        sub: "not-a-number".to_string(),
        exp: now + 3600,
        iat: now,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(KEY),
    )
    .unwrap();

    assert!(decode_session(&token, KEY).is_err());
}

#[test]
fn test_jwt_other_algorithm_rejected() {
    let now = unix_now();
    let claims = Claims {
        sub: "42".to_string(),
        exp: now + 3600,
        iat: now,
    };
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(KEY),
    )
    .unwrap();

    assert!(decode_session(&token, KEY).is_err());
}

#[tokio::test]
async fn test_session_cookie_accepted() {
    let (app, state) = common::create_test_app();
    state
        .identity_service
        .resolve_or_create(&fitlog::models::VerifiedUser {
            external_id: 42,
            first_name: "A".to_string(),
            last_name: None,
            username: None,
        })
        .await
        .unwrap();
    let token = common::create_test_jwt(42, &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_session_rejected() {
    let (app, state) = common::create_test_app();
    let now = unix_now();
    let token = create_jwt(42, &state.config.jwt_signing_key, now - 7200, now - 3600).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
