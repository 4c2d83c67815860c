// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore identity storage.
//!
//! Documents live in `user_profiles`, keyed by the external user ID, so the
//! document ID is the uniqueness constraint. Upserts never read-then-write:
//! - a create-only insert claims the ID for the first login
//! - on `AlreadyExists`, a field-masked update refreshes display fields
//!   without touching `profile_completed` or `created_at`

use crate::db::collections;
use crate::error::AppError;
use crate::models::{CanonicalIdentity, ProfileUpdate, VerifiedUser};
use firestore::errors::FirestoreError;
use firestore::paths;

/// Firestore client wrapper with typed identity operations.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // The emulator accepts any bearer token; an unsigned JWT keeps the SDK happy.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Identity Operations ─────────────────────────────────────

    /// Get an identity by external user ID.
    pub async fn get_identity(
        &self,
        telegram_id: i64,
    ) -> Result<Option<CanonicalIdentity>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USER_PROFILES)
            .obj()
            .one(&telegram_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create the identity if absent, otherwise refresh its display fields.
    pub async fn upsert_identity(
        &self,
        user: &VerifiedUser,
        now: &str,
    ) -> Result<(CanonicalIdentity, bool), AppError> {
        let doc_id = user.external_id.to_string();
        let fresh = CanonicalIdentity::from_verified(user, now);

        let inserted: Result<CanonicalIdentity, FirestoreError> = self
            .client
            .fluent()
            .insert()
            .into(collections::USER_PROFILES)
            .document_id(&doc_id)
            .object(&fresh)
            .execute()
            .await;

        match inserted {
            Ok(identity) => {
                tracing::info!(telegram_id = user.external_id, "Identity created");
                return Ok((identity, true));
            }
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::debug!(
                    telegram_id = user.external_id,
                    "Identity exists, refreshing display fields"
                );
            }
            Err(e) => return Err(AppError::Database(e.to_string())),
        }

        // Only the masked fields are written; the rest of `fresh` is ignored.
        let updated: CanonicalIdentity = self
            .client
            .fluent()
            .update()
            .fields(paths!(CanonicalIdentity::{
                first_name,
                last_name,
                username,
                updated_at
            }))
            .in_col(collections::USER_PROFILES)
            .document_id(&doc_id)
            .object(&fresh)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((updated, false))
    }

    /// Store profile fields and mark the profile complete.
    pub async fn update_profile(
        &self,
        telegram_id: i64,
        update: &ProfileUpdate,
        now: &str,
    ) -> Result<Option<CanonicalIdentity>, AppError> {
        let Some(mut identity) = self.get_identity(telegram_id).await? else {
            return Ok(None);
        };
        identity.apply_profile(update, now);

        // Field mask keeps `created_at` and `username` out of the write.
        let updated: CanonicalIdentity = self
            .client
            .fluent()
            .update()
            .fields(paths!(CanonicalIdentity::{
                first_name,
                last_name,
                birth_date,
                gender,
                height,
                weight,
                profile_completed,
                updated_at
            }))
            .in_col(collections::USER_PROFILES)
            .document_id(telegram_id.to_string())
            .object(&identity)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Some(updated))
    }
}
