//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPLITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SHOPLITE_JWT_SECRET` - Token signing secret (min 32 chars)
//!
//! ## Optional
//! - `SHOPLITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOPLITE_PORT` - Listen port (default: 8000)
//! - `SHOPLITE_JWT_ALGORITHM` - Token signing algorithm (default: HS256)
//! - `SHOPLITE_TOKEN_TTL_MINUTES` - Token lifetime (default: 1440)
//! - `SHOPLITE_ALLOWED_ORIGINS` - Comma-separated CORS allow-list
//! - `PAYKEEPER_URL` - Payment provider invoice endpoint
//! - `PAYKEEPER_SUCCESS_URL` / `PAYKEEPER_FAIL_URL` - Checkout redirect targets
//! - `FRONTEND_URL` - Base URL for payment callback redirects
//! - `MEDIA_ROOT` - Media storage root (default: media)
//! - `PRODUCTS_MEDIA_DIR` - Product image directory (default: `MEDIA_ROOT`/products)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use jsonwebtoken::Algorithm;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Default CORS allow-list: the local dev frontends.
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://127.0.0.1:5173",
    "http://localhost:5173",
    "http://127.0.0.1:5174",
    "http://localhost:5174",
    "http://localhost:3000",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token issuance and verification settings
    pub auth: AuthConfig,
    /// Payment provider settings
    pub payments: PaymentConfig,
    /// Media storage paths
    pub media: MediaConfig,
    /// CORS origin allow-list
    pub allowed_origins: Vec<String>,
}

/// Token issuance and verification configuration.
///
/// Implements `Debug` via the `SecretString` wrapper, which redacts the secret.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// Token signing algorithm
    pub jwt_algorithm: Algorithm,
    /// Token lifetime
    pub token_ttl: chrono::Duration,
}

/// Payment provider configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Provider invoice-creation endpoint
    pub provider_url: String,
    /// Redirect target the provider sends the customer to after payment
    pub success_url: String,
    /// Redirect target after a failed payment
    pub fail_url: String,
    /// Frontend base URL used for callback redirects
    pub frontend_url: String,
}

/// Media storage configuration.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Root directory served under `/media`
    pub media_root: PathBuf,
    /// Directory for product image uploads
    pub products_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the JWT secret fails the length check.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SHOPLITE_DATABASE_URL")?;
        let host = get_env_or_default("SHOPLITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPLITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SHOPLITE_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPLITE_PORT".to_string(), e.to_string()))?;

        let auth = AuthConfig::from_env()?;
        let payments = PaymentConfig::from_env();
        let media = MediaConfig::from_env();
        let allowed_origins = parse_origins(get_optional_env("SHOPLITE_ALLOWED_ORIGINS").as_deref());

        Ok(Self {
            database_url,
            host,
            port,
            auth,
            payments,
            media,
            allowed_origins,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = get_required_secret("SHOPLITE_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "SHOPLITE_JWT_SECRET")?;

        let jwt_algorithm = parse_algorithm(&get_env_or_default("SHOPLITE_JWT_ALGORITHM", "HS256"))?;

        let ttl_minutes = get_env_or_default("SHOPLITE_TOKEN_TTL_MINUTES", "1440")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPLITE_TOKEN_TTL_MINUTES".to_string(), e.to_string())
            })?;

        Ok(Self {
            jwt_secret,
            jwt_algorithm,
            token_ttl: chrono::Duration::minutes(ttl_minutes),
        })
    }
}

impl PaymentConfig {
    fn from_env() -> Self {
        Self {
            provider_url: get_env_or_default("PAYKEEPER_URL", "https://demo.paykeeper.ru/create/"),
            success_url: get_env_or_default(
                "PAYKEEPER_SUCCESS_URL",
                "http://localhost:5173/checkout/success",
            ),
            fail_url: get_env_or_default(
                "PAYKEEPER_FAIL_URL",
                "http://localhost:5173/checkout/fail",
            ),
            frontend_url: get_env_or_default("FRONTEND_URL", "http://localhost:3000"),
        }
    }
}

impl MediaConfig {
    fn from_env() -> Self {
        let media_root = PathBuf::from(get_env_or_default("MEDIA_ROOT", "media"));
        let products_dir = get_optional_env("PRODUCTS_MEDIA_DIR")
            .map_or_else(|| media_root.join("products"), PathBuf::from);

        Self {
            media_root,
            products_dir,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

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

/// Validate that the JWT secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Parse a token signing algorithm name.
fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    name.parse::<Algorithm>().map_err(|e| {
        ConfigError::InvalidEnvVar("SHOPLITE_JWT_ALGORITHM".to_string(), e.to_string())
    })
}

/// Split a comma-separated origin list, falling back to the local dev defaults.
fn parse_origins(value: Option<&str>) -> Vec<String> {
    match value {
        Some(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|&s| s.to_string())
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_jwt_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_jwt_secret(&secret, "TEST_SECRET").is_err());
    }

    #[test]
    fn test_validate_jwt_secret_valid_length() {
        let secret = SecretString::from("x".repeat(32));
        assert!(validate_jwt_secret(&secret, "TEST_SECRET").is_ok());
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(parse_algorithm("HS256").unwrap(), Algorithm::HS256);
        assert_eq!(parse_algorithm("HS512").unwrap(), Algorithm::HS512);
        assert!(parse_algorithm("bogus").is_err());
    }

    #[test]
    fn test_parse_origins_defaults() {
        let origins = parse_origins(None);
        assert!(origins.contains(&"http://localhost:5173".to_string()));
        assert_eq!(origins.len(), DEFAULT_ALLOWED_ORIGINS.len());

        // Blank value also falls back
        assert_eq!(parse_origins(Some("  ")).len(), DEFAULT_ALLOWED_ORIGINS.len());
    }

    #[test]
    fn test_parse_origins_custom_list() {
        let origins = parse_origins(Some("https://shop.example.com, https://admin.example.com"));
        assert_eq!(
            origins,
            vec![
                "https://shop.example.com".to_string(),
                "https://admin.example.com".to_string()
            ]
        );
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            auth: AuthConfig {
                jwt_secret: SecretString::from("x".repeat(32)),
                jwt_algorithm: Algorithm::HS256,
                token_ttl: chrono::Duration::minutes(1440),
            },
            payments: PaymentConfig {
                provider_url: "https://demo.paykeeper.ru/create/".to_string(),
                success_url: "http://localhost:5173/checkout/success".to_string(),
                fail_url: "http://localhost:5173/checkout/fail".to_string(),
                frontend_url: "http://localhost:3000".to_string(),
            },
            media: MediaConfig {
                media_root: PathBuf::from("media"),
                products_dir: PathBuf::from("media/products"),
            },
            allowed_origins: vec!["http://localhost:5173".to_string()],
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }
}
