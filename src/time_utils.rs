// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and init-data freshness.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current Unix time in whole seconds.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Whether an assertion issued at `auth_date` is still acceptable at `now`.
///
/// The window is inclusive: exactly `max_age_secs` old is still fresh.
pub fn is_fresh(auth_date: i64, now: i64, max_age_secs: i64) -> bool {
    now.saturating_sub(auth_date) <= max_age_secs
}
