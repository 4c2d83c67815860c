// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mini-app side of the login exchange.
//!
//! Handles:
//! - Reading init data from the host bridge
//! - Optimistic display of the (unverified) user
//! - Posting to `/auth/telegram` with retry on transient failures
//! - User-facing alert and haptics on the outcome
//!
//! Nothing here verifies anything; the server is the only authority.

use crate::bridge::{HapticKind, NotificationKind, PlatformBridge};
use crate::error::AUTH_FAILED_MESSAGE;
use crate::init_data::optimistic_user;
use crate::models::WebAppUser;
use crate::services::LoginResponse;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(250);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Exponential backoff before retry number `attempt` (1-based), capped.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_RETRY_DELAY)
}

/// Client-side sign-in errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server rejected login ({status}): {code}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
        retryable: bool,
    },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Rejected { retryable, .. } => *retryable,
            ClientError::Decode(_) => false,
        }
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> &str {
        match self {
            ClientError::Rejected { message, .. } if !message.is_empty() => message,
            _ => AUTH_FAILED_MESSAGE,
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "initData")]
    init_data: Option<&'a str>,
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    retryable: bool,
}

/// Signs the mini-app user in against the API.
pub struct AuthClient<B: PlatformBridge> {
    http: reqwest::Client,
    base_url: String,
    bridge: Arc<B>,
    max_attempts: u32,
    base_delay: Duration,
}

impl<B: PlatformBridge> AuthClient<B> {
    pub fn new(base_url: impl Into<String>, bridge: Arc<B>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bridge,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    /// Override the retry policy. `max_attempts` is clamped to at least one.
    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.base_delay = base_delay;
        self
    }

    /// Unverified user from the launch data, for display only.
    pub fn optimistic_user(&self) -> Option<WebAppUser> {
        self.bridge.init_data().as_deref().and_then(optimistic_user)
    }

    /// Exchange the host's init data for a session.
    pub async fn sign_in(&self) -> Result<LoginResponse, ClientError> {
        let init_data = self.bridge.init_data();
        let mut attempt = 1;

        let result = loop {
            match self.post_login(init_data.as_deref()).await {
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = backoff_delay(self.base_delay, attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Login failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => break other,
            }
        };

        match &result {
            Ok(response) => {
                tracing::info!(
                    external_id = response.user.external_id,
                    is_new_user = response.is_new_user,
                    "Signed in"
                );
                self.bridge
                    .haptic_feedback(HapticKind::Notification(NotificationKind::Success));
            }
            Err(err) => {
                tracing::warn!(attempts = attempt, error = %err, "Sign-in failed");
                self.bridge.show_alert(err.user_message());
                self.bridge
                    .haptic_feedback(HapticKind::Notification(NotificationKind::Error));
            }
        }

        result
    }

    async fn post_login(&self, init_data: Option<&str>) -> Result<LoginResponse, ClientError> {
        let url = format!("{}/auth/telegram", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { init_data })
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
                error: String::new(),
                message: String::new(),
                retryable: status.is_server_error(),
            });
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                code: body.error,
                message: body.message,
                retryable: body.retryable,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}
