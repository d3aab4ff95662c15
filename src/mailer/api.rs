// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Transactional-email HTTP API transport.
//!
//! Speaks the Resend-style `POST /emails` shape: bearer-token auth and a
//! JSON body with `from`, `to`, `subject`, `html` and `reply_to`.

use super::{MailMessage, Mailer, TransportError};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ApiEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

impl<'a> From<&'a MailMessage> for ApiEmail<'a> {
    fn from(message: &'a MailMessage) -> Self {
        Self {
            from: &message.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html_body,
            reply_to: message.reply_to.as_deref(),
        }
    }
}

/// Sends each message with a single HTTPS call to the provider.
pub struct ApiMailer {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ApiMailer {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            endpoint,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for ApiMailer {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TransportError::NotConfigured("MAIL_API_KEY is not set"))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&ApiEmail::from(message))
            .send()
            .await
            .map_err(|e| TransportError::Provider(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), to = %message.to, "Mail API accepted message");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn verify(&self) -> Result<(), TransportError> {
        match &self.api_key {
            Some(_) => Ok(()),
            None => Err(TransportError::NotConfigured("MAIL_API_KEY is not set")),
        }
    }
}
