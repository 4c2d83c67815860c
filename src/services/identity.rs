// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity upsert: verified user → one durable identity per external ID.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{CanonicalIdentity, ProfileUpdate, VerifiedUser};
use crate::time_utils::format_utc_rfc3339;
use std::future::Future;
use std::time::Duration;
use validator::Validate;

/// Result of [`IdentityService::resolve_or_create`].
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub identity: CanonicalIdentity,
    /// True when this call inserted the row
    pub created: bool,
}

/// Owns all writes to identity records.
#[derive(Clone)]
pub struct IdentityService {
    db: Database,
    /// Request-scoped bound on each storage round trip
    timeout: Duration,
}

impl IdentityService {
    pub fn new(db: Database, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Run a storage call under the request timeout.
    ///
    /// On timeout the write may or may not have been applied.
    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| AppError::StorageTimeout)?
    }

    /// Create the identity on first sight, refresh display fields afterwards.
    ///
    /// Idempotent per external ID, so callers may retry after a timeout.
    pub async fn resolve_or_create(&self, user: &VerifiedUser) -> Result<UpsertOutcome, AppError> {
        if user.external_id <= 0 {
            tracing::error!(
                external_id = user.external_id,
                "Verified user has no valid external id"
            );
            return Err(AppError::Internal(anyhow::anyhow!(
                "verified user without external id"
            )));
        }

        let now = format_utc_rfc3339(chrono::Utc::now());
        let (identity, created) = self
            .bounded(self.db.upsert_identity(user, &now))
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    telegram_id = user.external_id,
                    error = %e,
                    "Identity upsert failed"
                )
            })?;

        tracing::info!(
            telegram_id = identity.telegram_id,
            created,
            "Identity resolved"
        );

        Ok(UpsertOutcome { identity, created })
    }

    /// Get the identity for a signed-in user.
    pub async fn get(&self, telegram_id: i64) -> Result<CanonicalIdentity, AppError> {
        self.bounded(self.db.get_identity(telegram_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", telegram_id)))
    }

    /// Explicit profile update; the only path that sets `profile_completed`.
    pub async fn complete_profile(
        &self,
        telegram_id: i64,
        update: &ProfileUpdate,
    ) -> Result<CanonicalIdentity, AppError> {
        update
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let now = format_utc_rfc3339(chrono::Utc::now());
        let identity = self
            .bounded(self.db.update_profile(telegram_id, update, &now))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", telegram_id)))?;

        tracing::info!(telegram_id, "Profile completed");
        Ok(identity)
    }
}
