// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Turns a validated submission into outbound mail.
//!
//! The notification goes to the site owner with `Reply-To` set to the
//! submitter. When auto-reply is on, a confirmation follows to the
//! submitter. Sends are sequential and any failure fails the whole
//! dispatch; nothing is retried.

use crate::config::MailConfig;
use crate::mailer::{MailMessage, Mailer, TransportError};
use crate::template::{subject_for, EmailTemplate};
use crate::validator::ContactSubmission;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct Dispatcher {
    mailer: Arc<dyn Mailer>,
    template: EmailTemplate,
    sender: Option<String>,
    recipient: Option<String>,
    auto_reply: bool,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, template: EmailTemplate, config: &MailConfig) -> Self {
        Self {
            mailer,
            template,
            sender: config.sender().map(str::to_string),
            recipient: config.recipient().map(str::to_string),
            auto_reply: config.auto_reply,
            timeout: config.timeout(),
        }
    }

    pub fn auto_reply_enabled(&self) -> bool {
        self.auto_reply
    }

    fn sender(&self) -> Result<&str, TransportError> {
        self.sender
            .as_deref()
            .ok_or(TransportError::NotConfigured("no sender address (MAIL_FROM or EMAIL_USER)"))
    }

    fn recipient(&self) -> Result<&str, TransportError> {
        self.recipient
            .as_deref()
            .ok_or(TransportError::NotConfigured("no recipient address (MAIL_TO or EMAIL_USER)"))
    }

    /// The message delivered to the site owner.
    pub fn notification(
        &self,
        submission: &ContactSubmission,
        received_at: DateTime<Utc>,
    ) -> Result<MailMessage, TransportError> {
        Ok(MailMessage {
            to: self.recipient()?.to_string(),
            from: self.sender()?.to_string(),
            subject: subject_for(submission),
            html_body: self.template.render_notification(submission, received_at),
            reply_to: Some(submission.email.clone()),
        })
    }

    /// The confirmation sent back to the submitter.
    pub fn auto_reply(&self, submission: &ContactSubmission) -> Result<MailMessage, TransportError> {
        Ok(MailMessage {
            to: submission.email.clone(),
            from: self.sender()?.to_string(),
            subject: self.template.auto_reply_subject(submission),
            html_body: self.template.render_auto_reply(submission),
            reply_to: Some(self.recipient()?.to_string()),
        })
    }

    /// Send the notification, then the auto-reply if enabled.
    pub async fn dispatch(
        &self,
        submission: &ContactSubmission,
        received_at: DateTime<Utc>,
    ) -> Result<(), TransportError> {
        let notification = self.notification(submission, received_at)?;
        self.send(&notification).await?;
        info!(from = %submission.email, transport = self.mailer.name(), "Notification sent");

        if self.auto_reply {
            let reply = self.auto_reply(submission)?;
            self.send(&reply).await?;
            info!(to = %submission.email, "Auto-reply sent");
        }

        Ok(())
    }

    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        debug!(to = %message.to, subject = %message.subject, "Sending mail");
        tokio::time::timeout(self.timeout, self.mailer.send(message))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?
    }
}
