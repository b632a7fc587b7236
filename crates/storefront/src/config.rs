//! Environment-driven configuration.
//!
//! | Variable          | Default     | Purpose                               |
//! |-------------------|-------------|---------------------------------------|
//! | `STOREFRONT_HOST` | `127.0.0.1` | Bind address                          |
//! | `STOREFRONT_PORT` | `3000`      | Bind port                             |
//! | `EMAIL_ENDPOINT`  | unset       | Base URL of the email-sending service |
//! | `EMAIL_API_KEY`   | unset       | Bearer key for the email service      |
//!
//! With `EMAIL_ENDPOINT` unset the mailer runs disabled and logs sends
//! instead of performing them.

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub host: IpAddr,
    pub port: u16,
    pub email_endpoint: Option<Url>,
    pub email_api_key: Option<SecretString>,
}

impl StorefrontConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a set variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("STOREFRONT_HOST", "127.0.0.1")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "STOREFRONT_HOST",
                reason: e.to_string(),
            })?;
        let port = env_or("STOREFRONT_PORT", "3000")
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "STOREFRONT_PORT",
                reason: e.to_string(),
            })?;
        let email_endpoint = std::env::var("EMAIL_ENDPOINT")
            .ok()
            .map(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    name: "EMAIL_ENDPOINT",
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        let email_api_key = std::env::var("EMAIL_API_KEY").ok().map(SecretString::from);

        Ok(Self {
            host,
            port,
            email_endpoint,
            email_api_key,
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}
