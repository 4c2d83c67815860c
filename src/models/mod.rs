// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod identity;
pub mod webapp;

pub use identity::{CanonicalIdentity, ProfileUpdate, VerifiedUser};
pub use webapp::WebAppUser;
