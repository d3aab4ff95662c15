// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Everything comes from the process environment; a `.env` file is read
//! first when one exists. See [`Config::from_env`] for the variable names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

/// Display offsets must stay inside one day either side of UTC.
const MIN_UTC_OFFSET: i32 = -(24 * 60 - 1);
const MAX_UTC_OFFSET: i32 = 24 * 60 - 1;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Unknown mail transport {0:?} (expected \"smtp\" or \"api\")")]
    UnknownTransport(String),
}

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen host (default: 0.0.0.0)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Listen port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Frontend origin allowed by CORS. Any origin when unset.
    #[serde(default)]
    pub frontend_url: Option<String>,

    /// Deployment environment name (default: production)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Derive the client address from forwarding headers
    #[serde(default)]
    pub trust_proxy: bool,

    /// Static file root (default: public)
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Template configuration
    #[serde(default)]
    pub template: TemplateConfig,
}

/// Fixed-window rate limiting for the contact endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Accepted requests per client per window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 900)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Which outbound transport to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Authenticated SMTP account
    Smtp,
    /// Transactional-email HTTP API
    Api,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smtp => "smtp",
            Self::Api => "api",
        }
    }
}

/// Outbound mail configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_transport")]
    pub transport: TransportKind,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP account user, also the default sender and recipient
    #[serde(default)]
    pub smtp_user: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Sender address (default: the SMTP account user)
    #[serde(default)]
    pub from: Option<String>,

    /// Recipient of notifications (default: the SMTP account user)
    #[serde(default)]
    pub to: Option<String>,

    /// Send a confirmation back to the submitter
    #[serde(default)]
    pub auto_reply: bool,

    /// Per-send timeout in seconds (default: 20)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Template configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Escape user-supplied fields before interpolation (default: true)
    #[serde(default = "default_true")]
    pub escape_html: bool,

    /// Offset from UTC used for the timestamp in the footer (default: +05:30)
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_transport() -> TransportKind {
    TransportKind::Smtp
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_true() -> bool {
    true
}

fn default_utc_offset_minutes() -> i32 {
    330
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            frontend_url: None,
            environment: default_environment(),
            trust_proxy: false,
            static_dir: default_static_dir(),
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::default(),
            template: TemplateConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_password: None,
            api_key: None,
            api_url: default_api_url(),
            from: None,
            to: None,
            auto_reply: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            escape_html: default_true(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("transport", &self.transport)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "***"))
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("auto_reply", &self.auto_reply)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Recognised variables: `BIND_ADDR`, `PORT`, `FRONTEND_URL`, `APP_ENV`,
    /// `TRUST_PROXY`, `STATIC_DIR`, `RATE_LIMIT_MAX`, `RATE_LIMIT_WINDOW_SECS`,
    /// `MAIL_TRANSPORT`, `SMTP_HOST`, `SMTP_PORT`, `EMAIL_USER`, `EMAIL_PASS`,
    /// `MAIL_API_KEY`, `MAIL_API_URL`, `MAIL_FROM`, `MAIL_TO`, `AUTO_REPLY`,
    /// `MAIL_TIMEOUT_SECS`, `ESCAPE_HTML` and `DISPLAY_UTC_OFFSET_MINUTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build configuration from an explicit variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = EnvSource { vars };
        let defaults = Config::default();

        let api_key = env.string("MAIL_API_KEY");
        let transport = match env.string("MAIL_TRANSPORT") {
            Some(kind) => match kind.to_lowercase().as_str() {
                "smtp" => TransportKind::Smtp,
                "api" => TransportKind::Api,
                _ => return Err(ConfigError::UnknownTransport(kind)),
            },
            None if api_key.is_some() => TransportKind::Api,
            None => TransportKind::Smtp,
        };

        Ok(Config {
            bind_addr: env.string("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: env.parse("PORT")?.unwrap_or(defaults.port),
            frontend_url: env.string("FRONTEND_URL"),
            environment: env.string("APP_ENV").unwrap_or(defaults.environment),
            trust_proxy: env.flag("TRUST_PROXY")?.unwrap_or(false),
            static_dir: env.string("STATIC_DIR").unwrap_or(defaults.static_dir),
            rate_limit: RateLimitConfig {
                max_requests: env
                    .parse("RATE_LIMIT_MAX")?
                    .unwrap_or(defaults.rate_limit.max_requests),
                window_secs: env
                    .parse("RATE_LIMIT_WINDOW_SECS")?
                    .unwrap_or(defaults.rate_limit.window_secs),
            },
            mail: MailConfig {
                transport,
                smtp_host: env.string("SMTP_HOST").unwrap_or(defaults.mail.smtp_host),
                smtp_port: env.parse("SMTP_PORT")?.unwrap_or(defaults.mail.smtp_port),
                smtp_user: env.string("EMAIL_USER"),
                smtp_password: env.string("EMAIL_PASS"),
                api_key,
                api_url: env.string("MAIL_API_URL").unwrap_or(defaults.mail.api_url),
                from: env.string("MAIL_FROM"),
                to: env.string("MAIL_TO"),
                auto_reply: env.flag("AUTO_REPLY")?.unwrap_or(false),
                timeout_secs: env
                    .parse("MAIL_TIMEOUT_SECS")?
                    .unwrap_or(defaults.mail.timeout_secs),
            },
            template: TemplateConfig {
                escape_html: env.flag("ESCAPE_HTML")?.unwrap_or(true),
                utc_offset_minutes: env
                    .parse_in("DISPLAY_UTC_OFFSET_MINUTES", MIN_UTC_OFFSET..=MAX_UTC_OFFSET)?
                    .unwrap_or(defaults.template.utc_offset_minutes),
            },
        })
    }

    /// Whether error details may be returned to clients.
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// `host:port` to listen on.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl MailConfig {
    /// Sender address, falling back to the SMTP account.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.smtp_user.as_deref())
    }

    /// Notification recipient, falling back to the SMTP account.
    pub fn recipient(&self) -> Option<&str> {
        self.to.as_deref().or(self.smtp_user.as_deref())
    }

    /// Whether the selected transport has the credentials it needs.
    pub fn is_configured(&self) -> bool {
        let credentials = match self.transport {
            TransportKind::Smtp => self.smtp_user.is_some() && self.smtp_password.is_some(),
            TransportKind::Api => self.api_key.is_some(),
        };
        credentials && self.sender().is_some() && self.recipient().is_some()
    }

    /// Get the per-send timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Variable lookup where empty values count as unset.
struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    fn string(&self, var: &str) -> Option<String> {
        self.vars
            .get(var)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn parse<T: std::str::FromStr>(&self, var: &'static str) -> Result<Option<T>, ConfigError> {
        match self.string(var) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue { var, value }),
            None => Ok(None),
        }
    }

    fn parse_in<T>(
        &self,
        var: &'static str,
        range: RangeInclusive<T>,
    ) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr + PartialOrd,
    {
        match self.parse::<T>(var)? {
            Some(value) if !range.contains(&value) => Err(ConfigError::InvalidValue {
                var,
                value: self.string(var).unwrap_or_default(),
            }),
            parsed => Ok(parsed),
        }
    }

    fn flag(&self, var: &'static str) -> Result<Option<bool>, ConfigError> {
        match self.string(var) {
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Some(true)),
                "0" | "false" | "no" | "off" => Ok(Some(false)),
                _ => Err(ConfigError::InvalidValue { var, value }),
            },
            None => Ok(None),
        }
    }
}
