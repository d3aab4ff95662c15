// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound mail transports.
//!
//! The handler only ever sees [`Mailer`]. Two implementations exist:
//!
//! - [`SmtpMailer`]: authenticated SMTP account (lettre)
//! - [`ApiMailer`]: transactional-email HTTP API (reqwest)

mod api;
mod smtp;

pub use api::ApiMailer;
pub use smtp::SmtpMailer;

use crate::config::{MailConfig, TransportKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A fully-addressed email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html_body: String,
    pub reply_to: Option<String>,
}

/// Transport failure. The text may carry provider detail and is only shown
/// to clients in development mode.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Mail transport not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Mail provider error: {0}")]
    Provider(String),

    #[error("Mail provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Mail transport timed out after {0:?}")]
    Timeout(Duration),
}

/// Capability to deliver one message.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Short transport name for logs.
    fn name(&self) -> &'static str;

    /// Deliver `message`, returning once the provider accepted or refused it.
    async fn send(&self, message: &MailMessage) -> Result<(), TransportError>;

    /// Check that the transport is reachable and accepts our credentials.
    async fn verify(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Build the transport selected by the configuration.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, TransportError> {
    let mailer: Arc<dyn Mailer> = match config.transport {
        TransportKind::Smtp => Arc::new(SmtpMailer::new(
            &config.smtp_host,
            config.smtp_port,
            config.smtp_user.clone(),
            config.smtp_password.clone(),
        )?),
        TransportKind::Api => Arc::new(ApiMailer::new(
            config.api_url.clone(),
            config.api_key.clone(),
        )),
    };
    Ok(mailer)
}
