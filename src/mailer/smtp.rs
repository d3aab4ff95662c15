// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! SMTP account transport.

use super::{MailMessage, Mailer, TransportError};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, warn};

/// Port that speaks STARTTLS rather than implicit TLS.
const SUBMISSION_PORT: u16 = 587;

/// Sends through an authenticated SMTP relay such as Gmail.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Create a relay transport for `host:port`.
    ///
    /// Port 587 negotiates STARTTLS; any other port uses implicit TLS.
    /// Without both credentials the transport connects unauthenticated and
    /// the provider will normally refuse to relay.
    pub fn new(
        host: &str,
        port: u16,
        user: Option<String>,
        password: Option<String>,
    ) -> Result<Self, TransportError> {
        let builder = (if port == SUBMISSION_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        })
        .map_err(|e| TransportError::Provider(format!("failed to create SMTP transport: {e}")))?
        .port(port);

        let builder = match (user, password) {
            (Some(user), Some(password)) => builder.credentials(Credentials::new(user, password)),
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
        })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| TransportError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Convert a [`MailMessage`] into a lettre HTML message.
fn build_message(message: &MailMessage) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .from(mailbox(&message.from)?)
        .to(mailbox(&message.to)?)
        .subject(&message.subject)
        .header(ContentType::TEXT_HTML);

    // Reply-To carries the submitter's address, which only passed the loose
    // shape check; an address lettre cannot parse is dropped, not fatal.
    if let Some(reply_to) = &message.reply_to {
        match mailbox(reply_to) {
            Ok(addr) => builder = builder.reply_to(addr),
            Err(e) => warn!(error = %e, "Sending without Reply-To"),
        }
    }

    builder
        .body(message.html_body.clone())
        .map_err(|e| TransportError::Build(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        let email = build_message(message)?;
        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| TransportError::Provider(e.to_string()))?;
        debug!(code = %response.code(), to = %message.to, "SMTP relay accepted message");
        Ok(())
    }

    async fn verify(&self) -> Result<(), TransportError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(TransportError::Provider(
                "SMTP connection test failed".to_string(),
            )),
            Err(e) => Err(TransportError::Provider(e.to_string())),
        }
    }
}
