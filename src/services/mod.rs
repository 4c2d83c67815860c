// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod identity;

pub use auth::{AuthService, IdentitySummary, LoginResponse, Session};
pub use identity::{IdentityService, UpsertOutcome};
