//! Database layer.
//!
//! Identity records live in Firestore in production. The in-memory backend
//! serves local development and tests, and the offline backend fails every
//! call so storage outages can be exercised.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreStore;
pub use self::memory::MemoryStore;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::models::{CanonicalIdentity, ProfileUpdate, VerifiedUser};

/// Collection names as constants.
pub mod collections {
    /// Identity records (keyed by external user ID)
    pub const USER_PROFILES: &str = "user_profiles";
}

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreStore),
    Memory(MemoryStore),
    Offline,
}

/// Identity storage handle, cheap to clone and shared across requests.
#[derive(Clone)]
pub struct Database {
    backend: Backend,
}

impl Database {
    /// Connect to the backend selected in config.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let backend = match config.storage_backend {
            StorageBackend::Firestore => {
                Backend::Firestore(FirestoreStore::new(&config.gcp_project_id).await?)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory identity storage; data is lost on restart");
                Backend::Memory(MemoryStore::default())
            }
        };
        Ok(Self { backend })
    }

    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            backend: Backend::Memory(store),
        }
    }

    /// Create a mock database for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    fn offline() -> AppError {
        AppError::Database("Database not connected (offline mode)".to_string())
    }

    // ─── Identity Operations ─────────────────────────────────────

    /// Atomically create or refresh the identity for `user`.
    ///
    /// Returns the stored identity and whether it was newly created.
    pub async fn upsert_identity(
        &self,
        user: &VerifiedUser,
        now: &str,
    ) -> Result<(CanonicalIdentity, bool), AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.upsert_identity(user, now).await,
            Backend::Memory(store) => store.upsert_identity(user, now).await,
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Get an identity by external user ID.
    pub async fn get_identity(
        &self,
        telegram_id: i64,
    ) -> Result<Option<CanonicalIdentity>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.get_identity(telegram_id).await,
            Backend::Memory(store) => store.get_identity(telegram_id).await,
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Store profile fields and mark the profile complete.
    ///
    /// Returns `None` if no identity exists for `telegram_id`.
    pub async fn update_profile(
        &self,
        telegram_id: i64,
        update: &ProfileUpdate,
        now: &str,
    ) -> Result<Option<CanonicalIdentity>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.update_profile(telegram_id, update, now).await,
            Backend::Memory(store) => store.update_profile(telegram_id, update, now).await,
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Number of stored identities. Only the memory backend can answer.
    pub fn count_identities(&self) -> Option<usize> {
        match &self.backend {
            Backend::Memory(store) => Some(store.len()),
            Backend::Firestore(_) | Backend::Offline => None,
        }
    }
}
