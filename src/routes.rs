// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Router assembly.

use crate::error::panic_response;
use crate::handlers::{api_test, health, not_found, send_email, AppState};
use axum::{
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// CORS policy: the configured frontend origins with credentials, or any
/// origin without them.
pub fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = frontend_url
        .unwrap_or_default()
        .split(',')
        .filter_map(|o| o.trim().parse().ok())
        .collect();

    if origins.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .route("/health", get(health).fallback(not_found))
        .route("/api/health", get(health).fallback(not_found))
        .route("/api/test", get(api_test).fallback(not_found))
        .route("/api/send-email", post(send_email).fallback(not_found))
        .route("/api/contact", post(send_email).fallback(not_found))
        .fallback_service(static_files)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(state.config.frontend_url.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
