// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Fake transports.

use async_trait::async_trait;
use contact_relay::{MailMessage, Mailer, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Records every send attempt. Optionally fails the attempt with a given
/// zero-based index, or every attempt.
#[derive(Default)]
pub struct RecordingMailer {
    attempts: AtomicUsize,
    sent: Mutex<Vec<MailMessage>>,
    fail_at: Option<usize>,
    fail_all: bool,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every send fails.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_all: true,
            ..Default::default()
        })
    }

    /// Only the send with this index fails.
    pub fn failing_at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_at: Some(index),
            ..Default::default()
        })
    }

    /// Number of send attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Messages the fake accepted.
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        let index = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_all || self.fail_at == Some(index) {
            return Err(TransportError::Provider(
                "535-5.7.8 Username and Password not accepted".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
