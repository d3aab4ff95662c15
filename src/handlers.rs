// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay.
//!
//! The contact pipeline runs rate limiting, then validation, then mail
//! dispatch, and maps each outcome to a status code and JSON envelope.

use crate::clock::Clock;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::AppError;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::mailer::Mailer;
use crate::template::EmailTemplate;
use crate::validator::{self, ContactRequest};
use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, FromRequest, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use chrono::SecondsFormat;
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub dispatcher: Dispatcher,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
    pub started_at: Instant,
}

impl AppState {
    /// Wire up state from configuration, a transport and a time source.
    pub fn new(config: Config, mailer: Arc<dyn Mailer>, clock: Arc<dyn Clock>) -> Self {
        let template = EmailTemplate::new(&config.template);
        Self {
            limiter: RateLimiter::new(config.rate_limit.clone(), clock.clone()),
            dispatcher: Dispatcher::new(mailer, template, &config.mail),
            clock,
            config,
            started_at: Instant::now(),
        }
    }
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since startup
    pub uptime: f64,
}

/// Diagnostic response for `/api/test`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResponse {
    pub message: &'static str,
    pub environment: String,
    pub email_configured: bool,
    pub transport: &'static str,
    pub auto_reply: bool,
}

/// Contact form body, accepted as JSON or URL-encoded form data.
///
/// Any other content type yields an empty request, which then fails
/// validation as missing fields.
pub struct ContactBody(pub ContactRequest);

#[async_trait]
impl<S> FromRequest<S> for ContactBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let media_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_lowercase());

        match media_type.as_deref() {
            Some("application/json") => {
                let Json(body) = Json::<ContactRequest>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::InvalidBody(e.body_text()))?;
                Ok(Self(body))
            }
            Some("application/x-www-form-urlencoded") => {
                let Form(body) = Form::<ContactRequest>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::InvalidBody(e.body_text()))?;
                Ok(Self(body))
            }
            other => {
                debug!(content_type = ?other, "Unsupported body type, treating as empty");
                Ok(Self(ContactRequest::default()))
            }
        }
    }
}

/// Resolve the rate-limit key for a request.
///
/// Behind a trusted proxy the rightmost `X-Forwarded-For` entry is the
/// address that proxy saw; entries to its left are client-supplied.
/// `X-Real-IP` is the fallback. Otherwise only the TCP peer counts, since
/// forwarding headers are client-controlled.
pub fn client_key(trust_proxy: bool, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if trust_proxy {
        let forwarded = last_entry(headers, "x-forwarded-for")
            .or_else(|| last_entry(headers, "x-real-ip"));

        if let Some(addr) = forwarded {
            return match addr.parse::<IpAddr>() {
                Ok(ip) => ip.to_string(),
                Err(_) => addr.to_string(),
            };
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rightmost entry of a comma-separated header, unless it is blank.
fn last_entry<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: state
            .clock
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

/// Report environment and mail configuration.
pub async fn api_test(State(state): State<Arc<AppState>>) -> Json<TestResponse> {
    Json(TestResponse {
        message: "Backend is working!",
        environment: state.config.environment.clone(),
        email_configured: state.config.mail.is_configured(),
        transport: state.config.mail.transport.as_str(),
        auto_reply: state.dispatcher.auto_reply_enabled(),
    })
}

/// Accept a contact submission and relay it by email.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    ContactBody(request): ContactBody,
) -> Result<Response, AppError> {
    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let client = client_key(state.config.trust_proxy, &headers, peer);

    let remaining = match state.limiter.check(&client).await {
        RateLimitResult::Allowed { remaining, .. } => remaining,
        RateLimitResult::Limited { retry_after } => {
            info!(
                client = %client,
                retry_after_secs = retry_after.as_secs(),
                "Request rate limited"
            );
            return Err(AppError::RateLimited { retry_after });
        }
    };

    let submission = validator::validate(request).map_err(|e| {
        info!(client = %client, code = e.code(), "Validation failed");
        e
    })?;

    let received_at = state.clock.now();
    state
        .dispatcher
        .dispatch(&submission, received_at)
        .await
        .map_err(|e| {
            error!(client = %client, error = %e, "Email sending error");
            AppError::Dispatch {
                source: e,
                expose_details: state.config.is_development(),
            }
        })?;

    info!(client = %client, from = %submission.email, "Email sent successfully");

    Ok((
        StatusCode::OK,
        [
            ("X-RateLimit-Limit", state.limiter.max_requests().to_string()),
            ("X-RateLimit-Remaining", remaining.to_string()),
        ],
        Json(SuccessResponse {
            success: true,
            message: "Email sent successfully! Thank you for reaching out.",
        }),
    )
        .into_response())
}

/// Fallback for unmatched routes and methods.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
