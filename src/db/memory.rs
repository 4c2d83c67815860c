// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory identity storage.
//!
//! Each upsert runs inside a single `DashMap` entry, so concurrent logins
//! for the same ID serialize on the shard lock and converge on one row.

use crate::error::AppError;
use crate::models::{CanonicalIdentity, ProfileUpdate, VerifiedUser};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<DashMap<i64, CanonicalIdentity>>,
    /// Artificial round-trip delay, for timeout tests
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that waits `latency` before every operation.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            rows: Arc::default(),
            latency: Some(latency),
        }
    }

    /// Number of stored identities.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    async fn round_trip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub async fn upsert_identity(
        &self,
        user: &VerifiedUser,
        now: &str,
    ) -> Result<(CanonicalIdentity, bool), AppError> {
        self.round_trip().await;

        let result = match self.rows.entry(user.external_id) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().apply_login(user, now);
                (entry.get().clone(), false)
            }
            Entry::Vacant(entry) => {
                let identity = CanonicalIdentity::from_verified(user, now);
                entry.insert(identity.clone());
                (identity, true)
            }
        };
        Ok(result)
    }

    pub async fn get_identity(
        &self,
        telegram_id: i64,
    ) -> Result<Option<CanonicalIdentity>, AppError> {
        self.round_trip().await;
        Ok(self.rows.get(&telegram_id).map(|row| row.value().clone()))
    }

    pub async fn update_profile(
        &self,
        telegram_id: i64,
        update: &ProfileUpdate,
        now: &str,
    ) -> Result<Option<CanonicalIdentity>, AppError> {
        self.round_trip().await;
        Ok(self.rows.get_mut(&telegram_id).map(|mut row| {
            row.apply_profile(update, now);
            row.value().clone()
        }))
    }
}
