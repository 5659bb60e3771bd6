use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::auth::Claims;
use crate::entities::user::TokenPair;

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// A refresh token was presented where an access token is expected, or the reverse
    #[error("Unexpected token type")]
    WrongTokenType,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),
}

/// Token types for authentication
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived access token
    Access,
    /// Long-lived refresh token
    Refresh,
}

/// Signing configuration for issued tokens
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl JwtConfig {
    /// Load the configuration from environment variables.
    ///
    /// `JWT_SECRET` is required; the issuer and lifetimes have defaults.
    pub fn from_env() -> Result<Self, SecurityError> {
        let secret = env::var("JWT_SECRET").map_err(|e| {
            error!("JWT_SECRET environment variable not found: {}", e);
            SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
        })?;

        if secret.trim().is_empty() {
            return Err(SecurityError::ConfigError("JWT_SECRET cannot be empty".to_string()));
        }

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "health-calendar-api".to_string());

        // Access tokens expire in 15 minutes
        let access_minutes = env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(15);

        // Refresh tokens expire in 7 days
        let refresh_days = env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(7);

        Ok(Self {
            secret,
            issuer,
            access_ttl: Duration::minutes(access_minutes),
            refresh_ttl: Duration::days(refresh_days),
        })
    }

    /// Fixed configuration for tests
    #[cfg(any(test, feature = "mock"))]
    pub fn for_tests() -> Self {
        Self {
            secret: "test_secret_key_for_testing_only".to_string(),
            issuer: "test-issuer".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        }
    }

    fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        }
    }
}

/// Issues and validates HS256 tokens
#[derive(Debug, Clone)]
pub struct TokenService {
    config: JwtConfig,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Generate a new JWT token
    pub fn generate(&self, user_id: &str, token_type: TokenType) -> Result<String, SecurityError> {
        let now = Utc::now();
        let expiration = now + self.config.ttl(token_type);

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            token_type,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| {
            error!("Failed to encode JWT token: {}", e);
            SecurityError::TokenValidation(e.to_string())
        })?;

        // Never log the token itself
        info!("Generated {:?} token for user {}", token_type, user_id);
        debug!("Token expiration: {}", expiration);

        Ok(token)
    }

    /// Validate a token and check that it has the expected type
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, SecurityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_issuer(&[self.config.issuer.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                SecurityError::TokenValidation("Invalid signature".to_string())
            }
            _ => SecurityError::TokenValidation(e.to_string()),
        })?;

        if token_data.claims.token_type != expected {
            debug!(
                "Expected {:?} token, got {:?} for user {}",
                expected, token_data.claims.token_type, token_data.claims.sub
            );
            return Err(SecurityError::WrongTokenType);
        }

        Ok(token_data.claims)
    }

    /// Issue an access and refresh token for a user
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, SecurityError> {
        Ok(TokenPair {
            access_token: self.generate(user_id, TokenType::Access)?,
            refresh_token: self.generate(user_id, TokenType::Refresh)?,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_ttl.num_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(JwtConfig::for_tests())
    }

    #[test]
    fn test_generate_and_validate_token() {
        let tokens = service();
        let user_id = "test-user-123";
        let token = tokens.generate(user_id, TokenType::Access).unwrap();

        assert!(!token.is_empty());

        let claims = tokens.validate(&token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let tokens = service();
        let refresh = tokens.generate("user", TokenType::Refresh).unwrap();

        assert!(matches!(
            tokens.validate(&refresh, TokenType::Access),
            Err(SecurityError::WrongTokenType)
        ));
        assert!(tokens.validate(&refresh, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service();
        let claims = Claims {
            sub: "test-user-456".to_string(),
            iss: "test-issuer".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
            token_type: TokenType::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JwtConfig::for_tests().secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            tokens.validate(&token, TokenType::Access),
            Err(SecurityError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_issuer_or_secret_rejected() {
        let other = TokenService::new(JwtConfig {
            issuer: "someone-else".to_string(),
            ..JwtConfig::for_tests()
        });
        let token = other.generate("user", TokenType::Access).unwrap();
        assert!(service().validate(&token, TokenType::Access).is_err());

        let forged = TokenService::new(JwtConfig {
            secret: "another_secret".to_string(),
            ..JwtConfig::for_tests()
        });
        let token = forged.generate("user", TokenType::Access).unwrap();
        assert!(matches!(
            service().validate(&token, TokenType::Access),
            Err(SecurityError::TokenValidation(_))
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(service().validate("not-a-token", TokenType::Access).is_err());
    }

    #[test]
    fn test_issue_pair() {
        let pair = service().issue_pair("user-1").unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 15 * 60);
        assert_ne!(pair.access_token, pair.refresh_token);
    }
}
