use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::models::{AuthenticatedUser, Credentials, TokenClaims};
use crate::auth::Authenticator;
use crate::error::AppError;

/// Lifetime of issued session tokens.
pub const TOKEN_TTL_HOURS: i64 = 2;

/// Sign a session token for `user`.
pub fn issue_token(user: &AuthenticatedUser, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user.id.clone(),
        email: user.email.clone(),
        collection: user.collection.clone(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

/// Verify a session token and return its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<TokenClaims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<TokenClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::Auth(format!("Invalid session token: {}", e)))
}

/// Authenticates requests carrying an HS256 session token.
pub struct JwtAuthenticator {
    secret: String,
}

impl JwtAuthenticator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<AuthenticatedUser>, AppError> {
        let Some(token) = credentials.token() else {
            return Ok(None);
        };
        if self.secret.is_empty() {
            tracing::warn!("No token secret configured, rejecting session token");
            return Ok(None);
        }

        let claims = verify_token(token, &self.secret)?;
        Ok(Some(claims.into()))
    }
}
