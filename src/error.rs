// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP-boundary errors and the JSON envelope they render to.

use crate::mailer::TransportError;
use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Routes listed in 404 responses.
pub const AVAILABLE_ROUTES: &[&str] = &[
    "GET /",
    "GET /health",
    "GET /api/health",
    "GET /api/test",
    "POST /api/send-email",
    "POST /api/contact",
];

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed request body: {0}")]
    InvalidBody(String),

    #[error("Too many requests from this IP, please try again later.")]
    RateLimited { retry_after: Duration },

    #[error("Failed to send email. Please try again later or contact directly.")]
    Dispatch {
        source: TransportError,
        /// Include the transport error text in the response
        expose_details: bool,
    },

    #[error("Route not found")]
    NotFound,

    #[error("Internal server error")]
    Internal,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    #[serde(rename = "availableRoutes", skip_serializing_if = "Option::is_none")]
    pub available_routes: Option<&'static [&'static str]>,
}

impl ErrorResponse {
    fn new(error: String) -> Self {
        Self {
            success: false,
            error,
            code: None,
            details: None,
            retry_after_secs: None,
            available_routes: None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Dispatch { .. } | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Machine-readable error code, where one exists.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Validation(e) => Some(e.code()),
            Self::InvalidBody(_) => Some("invalid_body"),
            Self::RateLimited { .. } => Some("rate_limited"),
            Self::Dispatch { .. } => Some("send_failed"),
            Self::NotFound | Self::Internal => None,
        }
    }
}

/// Whole seconds until retry, rounded up.
fn retry_secs(retry_after: Duration) -> u64 {
    retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = ErrorResponse::new(self.to_string());
        body.code = self.code();

        match self {
            Self::RateLimited { retry_after } => {
                let secs = retry_secs(retry_after);
                body.retry_after_secs = Some(secs);
                return (status, [(header::RETRY_AFTER, secs.to_string())], Json(body))
                    .into_response();
            }
            Self::Dispatch {
                source,
                expose_details,
            } => {
                if expose_details {
                    body.details = Some(source.to_string());
                }
            }
            Self::NotFound => body.available_routes = Some(AVAILABLE_ROUTES),
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

/// Response for a panic caught in a handler.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Server error");
    AppError::Internal.into_response()
}
