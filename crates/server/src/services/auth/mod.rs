//! Authentication service.
//!
//! Provides password registration/login and signed-token issuance.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use shoplite_core::Email;

use crate::config::AuthConfig;
use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Claims embedded in an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email address.
    pub sub: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued-at (unix timestamp).
    pub iat: i64,
}

/// Authentication service.
///
/// Handles user registration, login, and token resolution.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    config: &'a AuthConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, config: &'a AuthConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            config,
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password, issuing an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = issue_token(user.email.as_str(), self.config)?;

        Ok((user, token))
    }

    /// Resolve the user an access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is invalid or expired.
    /// Returns `AuthError::UserNotFound` if the referenced user no longer exists.
    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = decode_token(token, self.config)?;

        let email = Email::parse(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        self.users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Issue a signed, time-limited access token for a subject.
///
/// # Errors
///
/// Returns `AuthError::TokenEncoding` if encoding fails.
pub fn issue_token(subject: &str, config: &AuthConfig) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: subject.to_owned(),
        iat: now.timestamp(),
        exp: (now + config.token_ttl).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(config.jwt_algorithm),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenEncoding)
}

/// Decode and validate an access token.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if the signature is invalid or the
/// token has expired.
pub fn decode_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        &Validation::new(config.jwt_algorithm),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

/// Validate password meets the acceptance policy: length >= 8, at least one
/// uppercase letter, at least one non-alphanumeric character.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if !password.chars().any(char::is_uppercase) {
        return Err(AuthError::WeakPassword(
            "password must contain at least one uppercase letter".to_owned(),
        ));
    }

    if password.chars().all(char::is_alphanumeric) {
        return Err(AuthError::WeakPassword(
            "password must contain at least one special character".to_owned(),
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jsonwebtoken::Algorithm;
    use secrecy::SecretString;

    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::from("0123456789abcdef0123456789abcdef"),
            jwt_algorithm: Algorithm::HS256,
            token_ttl: chrono::Duration::minutes(15),
        }
    }

    #[test]
    fn test_password_policy_too_short() {
        assert!(matches!(
            validate_password("Ab!"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_password_policy_no_uppercase() {
        assert!(matches!(
            validate_password("lowercase1!"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_password_policy_alphanumeric_only() {
        assert!(matches!(
            validate_password("Alphanumeric1"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_password_policy_accepts_valid() {
        assert!(validate_password("Sup3r-secret").is_ok());
    }

    #[test]
    fn test_hash_is_salted_and_verifies() {
        let first = hash_password("Sup3r-secret").unwrap();
        let second = hash_password("Sup3r-secret").unwrap();
        assert_ne!(first, second);

        assert!(verify_password("Sup3r-secret", &first).is_ok());
        assert!(matches!(
            verify_password("wrong-Passw0rd!", &first),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_token_roundtrip() {
        let config = test_config();
        let token = issue_token("user@example.com", &config).unwrap();
        let claims = decode_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let config = test_config();
        let token = issue_token("user@example.com", &config).unwrap();

        let other = AuthConfig {
            jwt_secret: SecretString::from("fedcba9876543210fedcba9876543210"),
            ..config
        };
        assert!(matches!(
            decode_token(&token, &other),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = AuthConfig {
            token_ttl: chrono::Duration::minutes(-5),
            ..test_config()
        };
        let token = issue_token("user@example.com", &config).unwrap();
        assert!(matches!(
            decode_token(&token, &config),
            Err(AuthError::InvalidToken)
        ));
    }
}
