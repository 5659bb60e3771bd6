use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use health_calendar_data::models::CreateUserRecord;
use health_calendar_data::repository::{RepositoryError, UserRepositoryTrait};

use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};
use crate::auth::token::{SecurityError, TokenService, TokenType};
use crate::entities::conversions;
use crate::entities::user::{LoginRequest, RefreshRequest, RegisterRequest, TokenPair, User};
use crate::services::validation_message;

/// User service errors
#[derive(Debug, Error)]
pub enum UserServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Email or username already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Refresh token rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Not found error
    #[error("User not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// Hashing or token signing failed
    #[error("Security error: {0}")]
    Security(String),

    /// Stored data could not be read
    #[error("Data error: {0}")]
    DataError(String),
}

/// Trait for user service operations
#[async_trait]
pub trait UserServiceTrait {
    /// Register a new account
    async fn register(&self, request: RegisterRequest) -> Result<User, UserServiceError>;

    /// Verify credentials and issue a token pair
    async fn login(&self, request: LoginRequest) -> Result<TokenPair, UserServiceError>;

    /// Exchange a refresh token for a new token pair
    async fn refresh(&self, request: RefreshRequest) -> Result<TokenPair, UserServiceError>;

    /// Look up a user by ID
    async fn get_user(&self, user_id: Uuid) -> Result<User, UserServiceError>;
}

/// User service for registration and login
pub struct UserService<R: UserRepositoryTrait> {
    repository: R,
    tokens: Arc<TokenService>,
}

impl<R: UserRepositoryTrait> UserService<R> {
    /// Create a new user service
    pub fn new(repository: R, tokens: Arc<TokenService>) -> Self {
        Self { repository, tokens }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> UserServiceError {
        match err {
            RepositoryError::NotFound(msg) => UserServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => UserServiceError::ValidationError(msg),
            RepositoryError::Conflict(msg) => UserServiceError::Conflict(msg),
            _ => UserServiceError::RepositoryError(err.to_string()),
        }
    }

    fn issue_pair(&self, user_id: &str) -> Result<TokenPair, UserServiceError> {
        self.tokens
            .issue_pair(user_id)
            .map_err(|e| UserServiceError::Security(e.to_string()))
    }
}

/// Hash a password as an Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String, UserServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserServiceError::Security(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

#[async_trait]
impl<R: UserRepositoryTrait + Send + Sync> UserServiceTrait for UserService<R> {
    async fn register(&self, request: RegisterRequest) -> Result<User, UserServiceError> {
        request
            .validate()
            .map_err(|e| UserServiceError::ValidationError(validation_message(&e)))?;

        let email = request.email.trim().to_lowercase();
        if self
            .repository
            .get_by_email(&email)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .is_some()
        {
            warn!("Registration rejected, email already registered");
            return Err(UserServiceError::Conflict("Email already registered".to_string()));
        }

        let record = CreateUserRecord {
            username: request.username.trim().to_string(),
            email,
            password_hash: hash_password(&request.password)?,
        };

        let created = self
            .repository
            .create(record)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        log_auth_event(
            AuthEvent::new(AuthEventType::Registration, Some(&created.id), true).with_auth_method("password"),
        );

        conversions::convert_to_domain_user(created).map_err(UserServiceError::DataError)
    }

    async fn login(&self, request: LoginRequest) -> Result<TokenPair, UserServiceError> {
        request
            .validate()
            .map_err(|e| UserServiceError::ValidationError(validation_message(&e)))?;

        let user = self
            .repository
            .get_by_email(request.email.trim())
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let user = match user {
            Some(user) if verify_password(&request.password, &user.password_hash) => user,
            found => {
                let user_id = found.map(|u| u.id);
                log_auth_event(
                    AuthEvent::new(AuthEventType::FailedLogin, user_id.as_deref(), false)
                        .with_details("Invalid email or password")
                        .with_auth_method("password"),
                );
                return Err(UserServiceError::InvalidCredentials);
            }
        };

        let pair = self.issue_pair(&user.id)?;
        log_auth_event(AuthEvent::new(AuthEventType::Login, Some(&user.id), true).with_auth_method("password"));
        Ok(pair)
    }

    async fn refresh(&self, request: RefreshRequest) -> Result<TokenPair, UserServiceError> {
        let claims = self
            .tokens
            .validate(&request.refresh_token, TokenType::Refresh)
            .map_err(|e| {
                log_auth_event(
                    AuthEvent::new(AuthEventType::TokenRefresh, None, false)
                        .with_details(e.to_string())
                        .with_auth_method("jwt"),
                );
                match e {
                    SecurityError::ConfigError(msg) => UserServiceError::Security(msg),
                    other => UserServiceError::Unauthorized(other.to_string()),
                }
            })?;

        let user_id = conversions::parse_string_to_uuid(&claims.sub).map_err(UserServiceError::Unauthorized)?;

        // The account must still exist
        self.get_user(user_id).await.map_err(|e| match e {
            UserServiceError::NotFound(_) => UserServiceError::Unauthorized("Unknown user".to_string()),
            other => other,
        })?;

        let pair = self.issue_pair(&claims.sub)?;
        log_auth_event(AuthEvent::new(AuthEventType::TokenRefresh, Some(&claims.sub), true).with_auth_method("jwt"));
        info!("Refreshed tokens for user {}", claims.sub);
        Ok(pair)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<User, UserServiceError> {
        let record = self
            .repository
            .get_by_id(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| UserServiceError::NotFound(format!("User with ID {} not found", user_id)))?;

        conversions::convert_to_domain_user(record).map_err(UserServiceError::DataError)
    }
}

/// Factory function to create a user service over the application repository
pub fn create_user_service(
    repository: health_calendar_data::repository::UserRepository,
    tokens: Arc<TokenService>,
) -> UserService<health_calendar_data::repository::UserRepository> {
    UserService::new(repository, tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::JwtConfig;
    use health_calendar_data::repository::tests::MockUserRepository;

    fn service(repo: MockUserRepository) -> UserService<MockUserRepository> {
        UserService::new(repo, Arc::new(TokenService::new(JwtConfig::for_tests())))
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong-pass", &hash));
        assert!(!verify_password("s3cret-pass", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let service = service(MockUserRepository::new());
        let user = service.register(register_request("Alice@Example.com")).await.unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_ne!(user.password_hash, "correct horse");
        assert!(verify_password("correct horse", &user.password_hash));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_conflict() {
        let service = service(MockUserRepository::new());
        service.register(register_request("alice@example.com")).await.unwrap();

        let err = service
            .register(register_request("ALICE@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_validates_request() {
        let service = service(MockUserRepository::new());
        let err = service
            .register(RegisterRequest {
                username: "al".to_string(),
                email: "not-an-email".to_string(),
                password: "short".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            UserServiceError::ValidationError(msg) => {
                assert!(msg.contains("username"));
                assert!(msg.contains("email"));
                assert!(msg.contains("password"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_and_refresh() {
        let service = service(MockUserRepository::new());
        let user = service.register(register_request("bob@example.com")).await.unwrap();

        let pair = service
            .login(LoginRequest {
                email: "bob@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(pair.token_type, "Bearer");

        let claims = service.tokens.validate(&pair.access_token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, user.id.to_string());

        let refreshed = service
            .refresh(RefreshRequest {
                refresh_token: pair.refresh_token.clone(),
            })
            .await
            .unwrap();
        assert!(service.tokens.validate(&refreshed.access_token, TokenType::Access).is_ok());

        // An access token cannot be used to refresh
        let err = service
            .refresh(RefreshRequest {
                refresh_token: pair.access_token,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_email() {
        let service = service(MockUserRepository::new());
        service.register(register_request("carol@example.com")).await.unwrap();

        for (email, password) in [("carol@example.com", "wrong password"), ("nobody@example.com", "correct horse")] {
            let err = service
                .login(LoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, UserServiceError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let err = service(MockUserRepository::new())
            .get_user(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_repository_failure_is_reported() {
        let err = service(MockUserRepository::failing("db down"))
            .get_user(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::RepositoryError(_)));
    }
}
