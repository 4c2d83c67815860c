//! Application configuration loaded from environment variables.
//!
//! Secrets are read once at startup and kept in memory behind [`Secret`],
//! which never prints its contents.

use crate::models::CanonicalIdentity;
use std::env;
use std::fmt;
use std::time::Duration;

/// Default freshness window for init data (24 hours).
pub const DEFAULT_INIT_DATA_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// A secret value that is redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw secret. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Which storage backend holds identity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    Memory,
}

/// How `/auth/telegram` establishes identity.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// Verify the signed init data against the bot token.
    Live,
    /// Local development: sign in the configured identity without verification.
    Fixture(CanonicalIdentity),
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub storage_backend: StorageBackend,
    /// Maximum accepted age of `auth_date`, in seconds
    pub init_data_max_age_secs: i64,
    /// Request-scoped timeout for the identity upsert
    pub upsert_timeout: Duration,
    /// Session lifetime, in seconds (always positive)
    pub session_ttl_secs: i64,
    pub auth_mode: AuthMode,

    // --- Secrets ---
    /// Bot token issued by the platform (init-data key material)
    pub bot_token: Secret,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Deterministic config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            init_data_max_age_secs: DEFAULT_INIT_DATA_MAX_AGE_SECS,
            upsert_timeout: Duration::from_secs(5),
            session_ttl_secs: 30 * 24 * 60 * 60,
            auth_mode: AuthMode::Live,
            bot_token: Secret::new("123456:TEST-BOT-TOKEN"),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        if bot_token.is_empty() {
            return Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
        }

        let storage_backend = match env::var("STORAGE_BACKEND").as_deref() {
            Err(_) | Ok("firestore") => StorageBackend::Firestore,
            Ok("memory") => StorageBackend::Memory,
            Ok(other) => {
                return Err(ConfigError::Invalid("STORAGE_BACKEND", other.to_string()));
            }
        };

        let auth_mode = match env::var("AUTH_MODE").as_deref() {
            Err(_) | Ok("live") => AuthMode::Live,
            Ok("fixture") => AuthMode::Fixture(fixture_identity_from_env()?),
            Ok(other) => return Err(ConfigError::Invalid("AUTH_MODE", other.to_string())),
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_or("PORT", 8080)?,
            storage_backend,
            init_data_max_age_secs: parse_or(
                "INIT_DATA_MAX_AGE_SECS",
                DEFAULT_INIT_DATA_MAX_AGE_SECS,
            )?,
            upsert_timeout: Duration::from_millis(parse_or("UPSERT_TIMEOUT_MS", 5000)?),
            session_ttl_secs: session_ttl_from_env()?,
            auth_mode,
            bot_token: Secret::new(bot_token),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Parse an optional numeric env var, falling back to `default` when unset.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Session lifetime; must be positive and fit a Unix timestamp offset.
fn session_ttl_from_env() -> Result<i64, ConfigError> {
    let ttl: i64 = parse_or("SESSION_TTL_SECS", 30 * 24 * 60 * 60)?;
    if ttl <= 0 {
        return Err(ConfigError::Invalid("SESSION_TTL_SECS", ttl.to_string()));
    }
    Ok(ttl)
}

/// Build the fixture identity from `FIXTURE_USER_*` variables.
fn fixture_identity_from_env() -> Result<CanonicalIdentity, ConfigError> {
    let mut identity = CanonicalIdentity::fixture();
    if let Ok(raw) = env::var("FIXTURE_USER_ID") {
        identity.telegram_id = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("FIXTURE_USER_ID", raw))?;
    }
    if let Ok(first_name) = env::var("FIXTURE_USER_FIRST_NAME") {
        identity.first_name = first_name;
    }
    if let Ok(last_name) = env::var("FIXTURE_USER_LAST_NAME") {
        identity.last_name = last_name;
    }
    if let Ok(username) = env::var("FIXTURE_USER_USERNAME") {
        identity.username = Some(username);
    }
    Ok(identity)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so everything touching them lives in one test.
    #[test]
    fn test_config_from_env() {
        env::set_var("TELEGRAM_BOT_TOKEN", " 42:abc ");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::remove_var("AUTH_MODE");
        env::remove_var("STORAGE_BACKEND");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.bot_token.expose(), "42:abc");
        assert_eq!(config.port, 8080);
        assert_eq!(config.init_data_max_age_secs, 86400);
        assert_eq!(config.storage_backend, StorageBackend::Firestore);
        assert_eq!(config.auth_mode, AuthMode::Live);

        env::set_var("AUTH_MODE", "fixture");
        env::set_var("FIXTURE_USER_ID", "777");
        let config = Config::from_env().expect("Config should load");
        match config.auth_mode {
            AuthMode::Fixture(identity) => assert_eq!(identity.telegram_id, 777),
            AuthMode::Live => panic!("expected fixture mode"),
        }

        env::set_var("AUTH_MODE", "sometimes");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("AUTH_MODE", _))
        ));
        env::remove_var("AUTH_MODE");
        env::remove_var("FIXTURE_USER_ID");

        // Larger than i64::MAX: rejected at startup instead of wrapping
        env::set_var("SESSION_TTL_SECS", "9223372036854775808");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("SESSION_TTL_SECS", _))
        ));
        env::set_var("SESSION_TTL_SECS", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("SESSION_TTL_SECS", _))
        ));
        env::set_var("SESSION_TTL_SECS", "3600");
        assert_eq!(Config::from_env().unwrap().session_ttl_secs, 3600);
        env::remove_var("SESSION_TTL_SECS");

        env::remove_var("TELEGRAM_BOT_TOKEN");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))
        ));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new("super-secret-token");
        let printed = format!("{:?}", secret);
        assert!(!printed.contains("super-secret-token"));

        let config = Config::test_default();
        assert!(!format!("{:?}", config).contains(config.bot_token.expose()));
    }
}
