// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for driving the contact relay router in-process.
//!
//! Requests go through `tower::ServiceExt::oneshot` with a recording mailer
//! and a manual clock, so no socket or mail provider is involved.

#![allow(dead_code)]

pub mod generators;
pub mod mailers;
pub mod metrics;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use contact_relay::{clock::ManualClock, router, AppState, Config};
use mailers::RecordingMailer;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

/// Directory holding the static fixture site.
pub fn fixture_static_dir() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/public").to_string()
}

/// Configuration with addresses filled in and the fixture site mounted.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.static_dir = fixture_static_dir();
    config.mail.from = Some("site@example.com".to_string());
    config.mail.to = Some("owner@example.com".to_string());
    config.mail.smtp_user = Some("site@example.com".to_string());
    config.mail.smtp_password = Some("app-password".to_string());
    config.mail.timeout_secs = 5;
    config
}

/// Response captured for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "body is not JSON ({e}): {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Router plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(test_config(), RecordingMailer::new())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with(config, RecordingMailer::new())
    }

    pub fn with(config: Config, mailer: Arc<RecordingMailer>) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
        ));
        let state = Arc::new(AppState::new(config, mailer.clone(), clock.clone()));
        Self {
            router: router(state.clone()),
            state,
            mailer,
            clock,
        }
    }

    /// Send a request as if it arrived from `peer`.
    pub async fn send(&self, mut request: Request<Body>, peer: &str) -> TestResponse {
        let addr: SocketAddr = format!("{peer}:40000").parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request, "192.0.2.1").await
    }

    pub async fn post_json(&self, path: &str, body: serde_json::Value, peer: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request, peer).await
    }

    pub async fn post_form(&self, path: &str, body: &str, peer: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request, peer).await
    }

    /// Submit a valid contact form from `peer`.
    pub async fn contact(&self, peer: &str) -> TestResponse {
        self.post_json("/api/send-email", generators::valid_submission(), peer)
            .await
    }
}
