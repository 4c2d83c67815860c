// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trusted init-data verification.
//!
//! The signing key is `HMAC_SHA256(key = "WebAppData", msg = bot_token)`;
//! the signature is `hex(HMAC_SHA256(key = signing_key, msg = data_check_string))`.
//! Both constants are fixed by the platform and must match bit-for-bit.

use super::parser::{self, data_check_string, parse_pairs, ParsedInitData};
use super::InitDataError;
use crate::config::Secret;
use crate::models::VerifiedUser;
use crate::time_utils::is_fresh;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Key material for the first-stage derivation.
const WEB_APP_DATA_KEY: &[u8] = b"WebAppData";

/// Verifier construction errors. These are fatal configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    #[error("bot token is empty")]
    EmptySecret,

    #[error("max age must not be negative: {0}")]
    InvalidMaxAge(i64),

    #[error("HMAC init failed: {0}")]
    Hmac(String),
}

/// Init data that passed signature and freshness checks.
///
/// Only [`InitDataVerifier::verify_at`] can construct this.
#[derive(Debug, Clone)]
pub struct VerifiedInitData {
    data: ParsedInitData,
}

impl VerifiedInitData {
    pub fn data(&self) -> &ParsedInitData {
        &self.data
    }

    pub fn user(&self) -> VerifiedUser {
        VerifiedUser::from(&self.data.user)
    }
}

/// Checks init data against the bot token.
#[derive(Clone)]
pub struct InitDataVerifier {
    /// HMAC keyed with the derived secret, cloned per signature
    mac: HmacSha256,
    max_age_secs: i64,
}

impl fmt::Debug for InitDataVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitDataVerifier")
            .field("max_age_secs", &self.max_age_secs)
            .finish_non_exhaustive()
    }
}

impl InitDataVerifier {
    /// Derive the signing key from the bot token.
    pub fn new(bot_token: &Secret, max_age_secs: i64) -> Result<Self, VerifierError> {
        if bot_token.is_empty() {
            return Err(VerifierError::EmptySecret);
        }
        if max_age_secs < 0 {
            return Err(VerifierError::InvalidMaxAge(max_age_secs));
        }

        let mut derive = HmacSha256::new_from_slice(WEB_APP_DATA_KEY)
            .map_err(|e| VerifierError::Hmac(e.to_string()))?;
        derive.update(bot_token.expose().as_bytes());
        let secret_key = derive.finalize().into_bytes();

        let mac = HmacSha256::new_from_slice(&secret_key)
            .map_err(|e| VerifierError::Hmac(e.to_string()))?;

        Ok(Self { mac, max_age_secs })
    }

    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    /// Lowercase hex signature of a data-check string.
    fn digest_hex(&self, check_string: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(check_string.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check the signature only. Freshness is a separate check.
    pub fn verify(&self, raw: &str) -> bool {
        let Some(pairs) = parse_pairs(raw) else {
            return false;
        };
        let Some((hash, check_string)) = data_check_string(&pairs) else {
            return false;
        };

        let expected = self.digest_hex(&check_string);
        expected.as_bytes().ct_eq(hash.as_bytes()).into()
    }

    /// Full check: signature, then shape, then freshness at `now`.
    pub fn verify_at(&self, raw: &str, now: i64) -> Result<VerifiedInitData, InitDataError> {
        if raw.trim().is_empty() {
            return Err(InitDataError::Missing);
        }

        if !self.verify(raw) {
            return Err(InitDataError::InvalidSignature);
        }

        let data = parser::parse(raw).ok_or(InitDataError::Unparseable)?;

        if !is_fresh(data.auth_date, now, self.max_age_secs) {
            return Err(InitDataError::Stale {
                age_secs: now.saturating_sub(data.auth_date),
            });
        }

        Ok(VerifiedInitData { data })
    }

    /// Sign `pairs` and return the encoded init-data string with `hash` appended.
    ///
    /// Used for fixtures and tests; production init data is signed by the platform.
    pub fn sign(&self, pairs: &[(&str, &str)]) -> String {
        let owned: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut fields: Vec<&(String, String)> = owned.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let check_string = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n");
        let hash = self.digest_hex(&check_string);

        owned
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .chain(std::iter::once(format!("hash={}", hash)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
