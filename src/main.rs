// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay Service
//!
//! Serves the portfolio's static files and relays contact-form submissions
//! as email.
//!
//! ## Endpoints
//!
//! - `GET /health`, `GET /api/health`: liveness with uptime
//! - `GET /api/test`: environment and mail configuration flags
//! - `POST /api/send-email`, `POST /api/contact`: submit the form
//!
//! ## Configuration
//!
//! Environment variables (a `.env` file is honoured):
//!
//! - `PORT`: listen port (default: 3000)
//! - `FRONTEND_URL`: CORS origin (default: any)
//! - `EMAIL_USER` / `EMAIL_PASS`: SMTP account
//! - `MAIL_API_KEY`: switches to the HTTP API transport
//! - `APP_ENV`: `development` exposes send-failure details
//! - `TRUST_PROXY`: key rate limits on `X-Forwarded-For`
//!
//! See [`contact_relay::Config::from_env`] for the full list.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::{
    clock::SystemClock, config::Config, handlers::AppState, mailer::build_mailer, router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load environment variables
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, "Failed to read .env file");
        }
    }

    let config = Config::from_env()?;
    info!(
        addr = %config.listen_addr(),
        environment = %config.environment,
        transport = config.mail.transport.as_str(),
        email_configured = config.mail.is_configured(),
        auto_reply = config.mail.auto_reply,
        trust_proxy = config.trust_proxy,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        "Starting contact relay"
    );

    let mailer = build_mailer(&config.mail)?;

    // Check the transport in the background; a failure is logged, not fatal
    let verify_mailer = mailer.clone();
    tokio::spawn(async move {
        match verify_mailer.verify().await {
            Ok(()) => info!(transport = verify_mailer.name(), "Email server is ready to send messages"),
            Err(e) => error!(transport = verify_mailer.name(), error = %e, "Email configuration error"),
        }
    });

    let addr: SocketAddr = config.listen_addr().parse()?;
    let state = Arc::new(AppState::new(config, mailer, Arc::new(SystemClock)));

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let evicted = cleanup_state.limiter.cleanup().await;
            if evicted > 0 {
                tracing::debug!(evicted, "Evicted expired rate windows");
            }
        }
    });

    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("HTTP server closed");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received: closing HTTP server"),
        _ = terminate => info!("SIGTERM signal received: closing HTTP server"),
    }
}
