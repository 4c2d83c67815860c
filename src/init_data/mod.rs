// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Platform init data: the signed identity assertion sent by the mini app.
//!
//! [`parser`] is untrusted and usable anywhere, for display only.
//! [`verifier`] needs the bot token and is the only source of
//! [`VerifiedInitData`].

pub mod parser;
pub mod verifier;

pub use parser::{data_check_string, optimistic_user, parse, parse_pairs, ParsedInitData};
pub use verifier::{InitDataVerifier, VerifiedInitData, VerifierError};

/// Why a piece of init data was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitDataError {
    #[error("init data is missing")]
    Missing,

    #[error("init data signature mismatch")]
    InvalidSignature,

    #[error("init data is malformed or incomplete")]
    Unparseable,

    #[error("init data is {age_secs}s old")]
    Stale { age_secs: i64 },
}
