//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FOURNIL_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//! - `FRONTEND_URL` - Public URL of the ordering SPA (payment redirects)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASS`, `SMTP_FROM`,
//!   `ADMIN_EMAIL` - mail transport; notifications are disabled when
//!   `SMTP_HOST` is absent
//! - `PAYPAL_CLIENT_ID`, `PAYPAL_SECRET`, `PAYPAL_MODE` (`sandbox`/`live`) -
//!   payment provider; PayPal orders fail softly when absent

use std::net::{IpAddr, SocketAddr};

use fournil_core::notify::SmtpSettings;
use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public URL of the ordering frontend, used for payment redirects
    pub frontend_url: String,
    /// Mail transport; `None` disables outbound email
    pub smtp: Option<SmtpSettings>,
    /// PayPal credentials; `None` makes PayPal orders fail softly
    pub paypal: Option<PayPalConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// PayPal REST API configuration.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct PayPalConfig {
    /// API base URL, derived from `PAYPAL_MODE`.
    pub base_url: String,
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub secret: SecretString,
}

impl std::fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("FOURNIL_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let frontend_url =
            get_env_or_default("FRONTEND_URL", "http://localhost:3001");

        let smtp = smtp_from_env()?;
        let paypal = paypal_from_env()?;
        if paypal.is_none() {
            tracing::warn!(
                "PayPal credentials not configured; PAYPAL orders will be created without a payment flow"
            );
        }
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            frontend_url,
            smtp,
            paypal,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read SMTP settings; absent `SMTP_HOST` disables email entirely.
fn smtp_from_env() -> Result<Option<SmtpSettings>, ConfigError> {
    let Some(host) = get_optional_env("SMTP_HOST") else {
        return Ok(None);
    };
    let port = get_env_or_default("SMTP_PORT", "587")
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

    Ok(Some(SmtpSettings {
        host,
        port,
        username: get_env_or_default("SMTP_USER", ""),
        password: SecretString::from(get_env_or_default("SMTP_PASS", "")),
        from_address: get_env_or_default("SMTP_FROM", "noreply@fournil.example"),
        admin_address: get_env_or_default("ADMIN_EMAIL", "commandes@fournil.example"),
    }))
}

/// Read PayPal credentials; both must be present to enable the provider.
fn paypal_from_env() -> Result<Option<PayPalConfig>, ConfigError> {
    let (Some(client_id), Some(secret)) = (
        get_optional_env("PAYPAL_CLIENT_ID"),
        get_optional_env("PAYPAL_SECRET"),
    ) else {
        return Ok(None);
    };

    let base_url = match get_env_or_default("PAYPAL_MODE", "sandbox").as_str() {
        "live" => "https://api-m.paypal.com".to_string(),
        "sandbox" => "https://api-m.sandbox.paypal.com".to_string(),
        other => {
            return Err(ConfigError::InvalidEnvVar(
                "PAYPAL_MODE".to_string(),
                format!("expected sandbox or live, got {other}"),
            ));
        }
    };

    Ok(Some(PayPalConfig {
        base_url,
        client_id,
        secret: SecretString::from(secret),
    }))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/fournil"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            frontend_url: "http://localhost:3001".to_string(),
            smtp: None,
            paypal: None,
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_paypal_config_debug_redacts_secret() {
        let config = PayPalConfig {
            base_url: "https://api-m.sandbox.paypal.com".to_string(),
            client_id: "client_id_value".to_string(),
            secret: SecretString::from("super_secret_value"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_value"));
    }
}
