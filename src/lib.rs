// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitlog: identity backend for a fitness-tracking mini-app
//!
//! The server turns signed mini-app launch data into a durable identity
//! and a session token. The `bridge` and `client` modules are the
//! untrusted mini-app side of the same exchange.

pub mod bridge;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod init_data;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use init_data::VerifierError;
use services::{AuthService, IdentityService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub identity_service: IdentityService,
    pub auth_service: AuthService,
}

impl AppState {
    /// Wire services from config and a connected database.
    pub fn new(config: Config, db: Database) -> Result<Self, VerifierError> {
        let identity_service = IdentityService::new(db.clone(), config.upsert_timeout);
        let auth_service = AuthService::new(&config, identity_service.clone())?;

        Ok(Self {
            config,
            db,
            identity_service,
            auth_service,
        })
    }
}
