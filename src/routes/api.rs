// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{CanonicalIdentity, ProfileUpdate};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/profile", put(put_profile))
}

// ─── User Profile ────────────────────────────────────────────

/// Current identity response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IdentityResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub external_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub profile_completed: bool,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CanonicalIdentity> for IdentityResponse {
    fn from(identity: CanonicalIdentity) -> Self {
        Self {
            external_id: identity.telegram_id,
            first_name: identity.first_name,
            last_name: identity.last_name,
            username: identity.username,
            profile_completed: identity.profile_completed,
            birth_date: identity.birth_date,
            gender: identity.gender,
            height: identity.height,
            weight: identity.weight,
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

/// Get current identity.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<IdentityResponse>> {
    let identity = state.identity_service.get(user.telegram_id).await?;
    Ok(Json(identity.into()))
}

/// Complete or edit the profile.
async fn put_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<IdentityResponse>> {
    let identity = state
        .identity_service
        .complete_profile(user.telegram_id, &update)
        .await?;

    tracing::info!(telegram_id = user.telegram_id, "Profile updated");

    Ok(Json(identity.into()))
}
