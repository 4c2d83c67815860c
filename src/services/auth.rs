// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login: init data → verified user → identity → session.

use crate::config::{AuthMode, Config};
use crate::error::AppError;
use crate::init_data::{InitDataError, InitDataVerifier, VerifierError};
use crate::middleware::auth::create_jwt;
use crate::models::{CanonicalIdentity, VerifiedUser};
use crate::services::IdentityService;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Identity fields returned to the client after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IdentitySummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub external_id: i64,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub profile_completed: bool,
}

impl From<&CanonicalIdentity> for IdentitySummary {
    fn from(identity: &CanonicalIdentity) -> Self {
        Self {
            external_id: identity.telegram_id,
            first_name: identity.first_name.clone(),
            last_name: Some(identity.last_name.clone()).filter(|s| !s.is_empty()),
            username: identity.username.clone(),
            profile_completed: identity.profile_completed,
        }
    }
}

/// Session artifact handed to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    /// Unix timestamp
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub expires_at: i64,
}

/// Successful `/auth/telegram` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub success: bool,
    pub user: IdentitySummary,
    pub session: Session,
    pub is_new_user: bool,
}

/// Trusted login flow. Holds the verifier, so it must never run client-side.
#[derive(Clone)]
pub struct AuthService {
    mode: AuthMode,
    verifier: InitDataVerifier,
    identities: IdentityService,
    jwt_signing_key: Vec<u8>,
    session_ttl_secs: i64,
}

impl AuthService {
    pub fn new(config: &Config, identities: IdentityService) -> Result<Self, VerifierError> {
        let verifier = InitDataVerifier::new(&config.bot_token, config.init_data_max_age_secs)?;

        if let AuthMode::Fixture(identity) = &config.auth_mode {
            tracing::warn!(
                telegram_id = identity.telegram_id,
                "Fixture auth mode: init data is NOT verified"
            );
        }

        Ok(Self {
            mode: config.auth_mode.clone(),
            verifier,
            identities,
            jwt_signing_key: config.jwt_signing_key.clone(),
            session_ttl_secs: config.session_ttl_secs,
        })
    }

    pub fn verifier(&self) -> &InitDataVerifier {
        &self.verifier
    }

    /// Establish who is logging in, according to the configured mode.
    fn authenticate(&self, init_data: Option<&str>, now: i64) -> Result<VerifiedUser, AppError> {
        match &self.mode {
            AuthMode::Fixture(identity) => Ok(VerifiedUser::from(identity)),
            AuthMode::Live => {
                let raw = init_data.ok_or(AppError::MissingInitData)?;
                self.verifier
                    .verify_at(raw, now)
                    .map(|verified| verified.user())
                    .map_err(|err| {
                        match &err {
                            InitDataError::InvalidSignature => {
                                tracing::warn!(reason = "signature", "Init data rejected")
                            }
                            InitDataError::Stale { age_secs } => {
                                tracing::warn!(reason = "stale", age_secs, "Init data rejected")
                            }
                            other => {
                                tracing::info!(reason = %other, "Init data rejected")
                            }
                        }
                        AppError::from(err)
                    })
            }
        }
    }

    /// Verify, upsert the identity, and mint a session.
    pub async fn login(&self, init_data: Option<&str>, now: i64) -> Result<LoginResponse, AppError> {
        let user = self.authenticate(init_data, now)?;
        let outcome = self.identities.resolve_or_create(&user).await?;

        let telegram_id = outcome.identity.telegram_id;
        let expires_at = now.saturating_add(self.session_ttl_secs);
        let access_token = create_jwt(telegram_id, &self.jwt_signing_key, now, expires_at)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

        tracing::info!(
            telegram_id,
            is_new_user = outcome.created,
            "Login successful"
        );

        Ok(LoginResponse {
            success: true,
            user: IdentitySummary::from(&outcome.identity),
            session: Session {
                access_token,
                token_type: "bearer".to_string(),
                expires_at,
            },
            is_new_user: outcome.created,
        })
    }
}
