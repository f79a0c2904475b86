//! Startup configuration read from the environment.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

use crate::outbound::mail::SmtpConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SMTP_PORT: u16 = 587;
const MIN_SECRET_BYTES: usize = 32;

/// A configuration variable is missing or does not parse.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {variable}: {message}")]
    Invalid {
        variable: &'static str,
        message: String,
    },
}

impl ConfigError {
    fn invalid(variable: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            variable,
            message: message.into(),
        }
    }
}

/// Everything the process needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub token_secret: Vec<u8>,
    pub smtp: SmtpConfig,
    pub reset_url_base: String,
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] encountered so startup logs name
    /// the offending variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|name| env::var(name).ok())
    }

    /// Read the configuration from an arbitrary lookup, used by tests.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = require(&get, "DATABASE_URL")?;

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|err| ConfigError::invalid("BIND_ADDR", format!("{err}")))?;

        let token_secret = require(&get, "TOKEN_SECRET")?.into_bytes();
        if token_secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::invalid(
                "TOKEN_SECRET",
                format!("must be at least {MIN_SECRET_BYTES} bytes"),
            ));
        }

        let smtp_port = match get("SMTP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|err| ConfigError::invalid("SMTP_PORT", format!("{err}")))?,
            None => DEFAULT_SMTP_PORT,
        };
        let smtp = SmtpConfig {
            host: require(&get, "SMTP_HOST")?,
            port: smtp_port,
            credentials: Some((
                require(&get, "SMTP_USERNAME")?,
                require(&get, "SMTP_PASSWORD")?,
            )),
            from: require(&get, "MAIL_FROM")?,
        };

        let reset_url_base = require(&get, "RESET_URL_BASE")?
            .trim_end_matches('/')
            .to_owned();

        Ok(Self {
            database_url,
            bind_addr,
            token_secret,
            smtp,
            reset_url_base,
        })
    }
}

fn require(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    match get(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(ConfigError::invalid(name, "value is empty")),
        None => Err(ConfigError::Missing(name)),
    }
}
