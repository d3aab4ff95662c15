// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTML bodies for the notification and auto-reply emails.

use crate::config::TemplateConfig;
use crate::validator::ContactSubmission;
use chrono::{DateTime, FixedOffset, Offset, Utc};

const NOTIFICATION_STYLE: &str = r#"
    body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
    .container { max-width: 600px; margin: 0 auto; padding: 20px; }
    .header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
             color: white; padding: 20px; border-radius: 5px 5px 0 0; }
    .content { background: #f9f9f9; padding: 20px; border-radius: 0 0 5px 5px; }
    .field { margin-bottom: 15px; }
    .label { font-weight: bold; color: #667eea; }
    .value { margin-top: 5px; padding: 10px; background: white; border-radius: 3px; }
"#;

/// Default subject line for a submission without one.
pub fn subject_for(submission: &ContactSubmission) -> String {
    match &submission.subject {
        Some(subject) => subject.clone(),
        None => format!("Portfolio Contact from {}", submission.name),
    }
}

/// Escape the characters that would let a field break out of its element.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Renders email bodies. Pure: same input, same output.
#[derive(Debug, Clone)]
pub struct EmailTemplate {
    escape: bool,
    offset: FixedOffset,
}

impl EmailTemplate {
    pub fn new(config: &TemplateConfig) -> Self {
        let offset = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self {
            escape: config.escape_html,
            offset,
        }
    }

    /// Interpolate a user-supplied value.
    ///
    /// With escaping disabled the raw value is inserted as-is, markup included.
    fn field(&self, value: &str) -> String {
        if self.escape {
            escape_html(value)
        } else {
            value.to_string()
        }
    }

    /// Interpolate a multi-line value, turning each `\n` into `<br>`.
    fn multiline(&self, value: &str) -> String {
        self.field(value).replace('\n', "<br>")
    }

    fn timestamp(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format("%d/%m/%Y, %-I:%M:%S %P")
            .to_string()
    }

    /// Body of the message delivered to the site owner.
    pub fn render_notification(
        &self,
        submission: &ContactSubmission,
        received_at: DateTime<Utc>,
    ) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <style>{style}</style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h2>📧 New Portfolio Contact Message</h2>
    </div>
    <div class="content">
      <div class="field">
        <div class="label">👤 Name:</div>
        <div class="value">{name}</div>
      </div>
      <div class="field">
        <div class="label">📧 Email:</div>
        <div class="value">{email}</div>
      </div>
      <div class="field">
        <div class="label">💬 Message:</div>
        <div class="value">{message}</div>
      </div>
      <div style="margin-top: 20px; padding-top: 20px; border-top: 1px solid #ddd; color: #666; font-size: 12px;">
        <p>Sent from your portfolio website</p>
        <p>Time: {time}</p>
      </div>
    </div>
  </div>
</body>
</html>
"#,
            style = NOTIFICATION_STYLE,
            name = self.field(&submission.name),
            email = self.field(&submission.email),
            message = self.multiline(&submission.message),
            time = self.timestamp(received_at),
        )
    }

    /// Subject of the confirmation sent back to the submitter.
    pub fn auto_reply_subject(&self, submission: &ContactSubmission) -> String {
        format!("Thanks for reaching out, {}", submission.name)
    }

    /// Body of the confirmation sent back to the submitter.
    pub fn render_auto_reply(&self, submission: &ContactSubmission) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <style>{style}</style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h2>Thanks for getting in touch!</h2>
    </div>
    <div class="content">
      <p>Hi {name},</p>
      <p>Your message has been received and I will get back to you as soon as I can.</p>
      <div class="field">
        <div class="label">Your message:</div>
        <div class="value">{message}</div>
      </div>
    </div>
  </div>
</body>
</html>
"#,
            style = NOTIFICATION_STYLE,
            name = self.field(&submission.name),
            message = self.multiline(&submission.message),
        )
    }
}
