// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay
//!
//! Accepts contact-form submissions from a portfolio site and relays them
//! as email:
//!
//! - Fixed-window rate limiting per client address (5 per 15 minutes)
//! - Required-field and email-shape validation
//! - HTML notification rendering, with optional auto-reply
//! - Delivery through SMTP or a transactional-email API

pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod routes;
pub mod template;
pub mod validator;

pub use config::Config;
pub use handlers::AppState;
pub use limiter::{RateLimitResult, RateLimiter};
pub use mailer::{MailMessage, Mailer, TransportError};
pub use routes::router;
pub use validator::{ContactRequest, ContactSubmission, ValidationError};
