// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::init_data::InitDataError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message shown to the client for every authentication failure.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

/// Message shown to the client for transient storage failures.
pub const TRY_AGAIN_MESSAGE: &str = "Please try again";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("initData is required")]
    MissingInitData,

    #[error("Init data signature is invalid")]
    InvalidSignature,

    #[error("Init data could not be parsed")]
    UnparseableInitData,

    #[error("Init data is too old ({age_secs}s)")]
    StaleInitData { age_secs: i64 },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage operation timed out")]
    StorageTimeout,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the caller may safely retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::StorageTimeout)
    }

    /// Machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingInitData => "missing_init_data",
            AppError::InvalidSignature => "invalid_signature",
            AppError::UnparseableInitData => "unparseable_init_data",
            AppError::StaleInitData { .. } => "stale_init_data",
            AppError::Unauthorized => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Database(_) => "storage_unavailable",
            AppError::StorageTimeout => "storage_timeout",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingInitData
            | AppError::UnparseableInitData
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidSignature | AppError::StaleInitData { .. } | AppError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::StorageTimeout | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<InitDataError> for AppError {
    fn from(err: InitDataError) -> Self {
        match err {
            InitDataError::Missing => AppError::MissingInitData,
            InitDataError::InvalidSignature => AppError::InvalidSignature,
            InitDataError::Unparseable => AppError::UnparseableInitData,
            InitDataError::Stale { age_secs } => AppError::StaleInitData { age_secs },
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
    retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::MissingInitData
            | AppError::InvalidSignature
            | AppError::UnparseableInitData
            | AppError::StaleInitData { .. }
            | AppError::Unauthorized => {
                tracing::warn!(reason = self.code(), error = %self, "Authentication rejected");
                AUTH_FAILED_MESSAGE.to_string()
            }
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                TRY_AGAIN_MESSAGE.to_string()
            }
            AppError::StorageTimeout => {
                tracing::error!("Storage operation timed out, outcome unknown");
                TRY_AGAIN_MESSAGE.to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "Internal server error".to_string()
            }
        };

        let body = ErrorResponse {
            success: false,
            error: self.code(),
            message,
            retryable: self.is_retryable(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
