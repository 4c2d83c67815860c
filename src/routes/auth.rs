// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mini-app login route.

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::services::LoginResponse;
use crate::time_utils::unix_now;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/telegram", post(telegram_login))
}

/// Login request body sent by the mini-app.
#[derive(Debug, Deserialize)]
pub struct TelegramAuthRequest {
    /// Raw init-data query string, exactly as the platform delivered it.
    #[serde(rename = "initData", default)]
    pub init_data: Option<String>,
}

/// Exchange signed init data for a session.
///
/// A missing or malformed body is treated as missing init data.
async fn telegram_login(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<TelegramAuthRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let init_data = match body {
        Ok(Json(request)) => request.init_data,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Login body rejected");
            None
        }
    };

    let response = state
        .auth_service
        .login(init_data.as_deref(), unix_now())
        .await?;

    Ok(Json(response))
}
