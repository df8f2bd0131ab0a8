//! # Application Configuration
//!
//! Read once from the environment at startup and passed by reference into
//! [`AppState::from_config`](crate::state::AppState::from_config). Handlers
//! never read the environment themselves.

use pay_core::{PaymentError, PaymentResult};
use pay_stripe::StripeConfig;
use std::env;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_ENVIRONMENT: &str = "development";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for local development
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers
    Json,
}

impl LogFormat {
    /// Parse `LOG_FORMAT`; anything other than `json` is pretty
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Single allowed CORS origin; `None` allows every origin
    pub frontend_url: Option<String>,
    pub log_format: LogFormat,
    pub stripe: StripeConfig,
}

impl AppConfig {
    /// Load from environment variables (and `.env`, if present)
    pub fn from_env() -> PaymentResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> PaymentResult<Self> {
        let port = match get("PORT").filter(|p| !p.is_empty()) {
            Some(p) => p.trim().parse::<u16>().map_err(|_| {
                PaymentError::Configuration(format!("PORT must be a port number, got {:?}", p))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: get("HOST")
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            environment: get("ENVIRONMENT")
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            frontend_url: get("FRONTEND_URL")
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            log_format: LogFormat::parse(get("LOG_FORMAT").as_deref()),
            stripe: StripeConfig::from_vars(&get)?,
        })
    }

    /// `host:port`, resolved by the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// In production the listener belongs to the hosting layer
    pub fn should_bind_listener(&self) -> bool {
        !self.is_production()
    }
}
