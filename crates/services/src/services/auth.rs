//! Password hashing and admin session tokens.
//!
//! Sessions are stateless HS256 JWTs. The server checks the embedded email
//! against the configured admin email on every request, so changing that
//! setting locks out old sessions.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const BCRYPT_COST: u32 = 12;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const SESSION_TTL: Duration = Duration::days(30);
pub const SESSION_COOKIE: &str = "folio_session";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    #[error("invalid session token")]
    InvalidToken,
    #[error("session expired")]
    TokenExpired,
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("password task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub fn check_password_length(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

/// bcrypt at [`BCRYPT_COST`], off the async runtime.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, BCRYPT_COST).await
}

pub async fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(valid)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("keys", &"<secret>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionService {
    pub fn new(secret: &SecretString) -> Self {
        Self::with_ttl(secret, SESSION_TTL)
    }

    pub fn with_ttl(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<IssuedSession, AuthError> {
        self.issue_at(user_id, email, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, AuthError> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            sub: user_id,
            email: email.to_lowercase(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedSession { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 30;

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SessionService {
        SessionService::new(&SecretString::from("test-secret-value"))
    }

    #[test]
    fn test_issue_and_verify() {
        let service = service();
        let user_id = Uuid::new_v4();

        let session = service.issue(user_id, "Admin@Example.org").unwrap();
        let claims = service.verify(&session.token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "admin@example.org");
        assert_eq!(claims.exp - claims.iat, SESSION_TTL.num_seconds());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = service();
        let issued_at = Utc::now() - Duration::days(31);
        let session = service
            .issue_at(Uuid::new_v4(), "a@b.org", issued_at)
            .unwrap();
        assert!(matches!(
            service.verify(&session.token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = SessionService::new(&SecretString::from("another-secret"));
        let session = other.issue(Uuid::new_v4(), "a@b.org").unwrap();
        assert!(matches!(
            service().verify(&session.token),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(service().verify(""), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_password_hash_roundtrip() {
        let hash = hash_password_with_cost("correct horse", 4).await.unwrap();
        assert!(verify_password("correct horse", &hash).await.unwrap());
        assert!(!verify_password("wrong horse", &hash).await.unwrap());
    }

    #[test]
    fn test_password_length() {
        assert!(check_password_length("1234567").is_err());
        assert!(check_password_length("12345678").is_ok());
    }
}
