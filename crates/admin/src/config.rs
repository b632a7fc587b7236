//! Environment-driven configuration.
//!
//! | Variable         | Default     | Purpose                               |
//! |------------------|-------------|---------------------------------------|
//! | `ADMIN_HOST`     | `127.0.0.1` | Bind address                          |
//! | `ADMIN_PORT`     | `3001`      | Bind port                             |
//! | `EMAIL_ENDPOINT` | unset       | Base URL of the email-sending service |
//! | `EMAIL_API_KEY`  | unset       | Bearer key for the email service      |

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
pub struct AdminConfig {
    pub host: IpAddr,
    pub port: u16,
    pub email_endpoint: Option<Url>,
    pub email_api_key: Option<SecretString>,
}

impl AdminConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a set variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("ADMIN_HOST", "127.0.0.1")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "ADMIN_HOST",
                reason: e.to_string(),
            })?;
        let port = env_or("ADMIN_PORT", "3001")
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "ADMIN_PORT",
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
