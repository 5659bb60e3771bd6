use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::{CreateUserRecord, ProfileUpdateRecord, UserRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for users
#[async_trait]
pub trait UserRepositoryTrait {
    /// Create a new user. Duplicate usernames or emails are a conflict.
    async fn create(&self, request: CreateUserRecord) -> Result<UserRecord, RepositoryError>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError>;

    /// Get a user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Update the profile fields of a user
    async fn update_profile(&self, id: Uuid, update: ProfileUpdateRecord) -> Result<UserRecord, RepositoryError>;

    /// Replace the stored health assessment and stamp `last_health_update`
    async fn update_health_data(
        &self,
        id: Uuid,
        health_data: serde_json::Value,
    ) -> Result<UserRecord, RepositoryError>;
}

/// Repository for users, backed by SQLite when a pool is given and by
/// process memory otherwise.
#[derive(Debug, Clone, Default)]
pub struct UserRepository {
    pool: Option<DatabasePool>,
    storage: InMemoryStorage,
}

impl UserRepository {
    /// Create a new repository over an optional database pool
    pub fn new(pool: Option<DatabasePool>) -> Self {
        Self {
            pool,
            storage: InMemoryStorage::new(),
        }
    }

    /// Create a repository that keeps users in memory
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    fn reload(&self, id: &str) -> Result<UserRecord, RepositoryError> {
        let user = match &self.pool {
            Some(pool) => DatabaseStorage::user_by_id(pool, id)?,
            None => self.storage.user_by_id(id)?,
        };
        user.ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, request: CreateUserRecord) -> Result<UserRecord, RepositoryError> {
        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: request.username,
            email: request.email.trim().to_string(),
            password_hash: request.password_hash,
            created_at: Utc::now().to_rfc3339(),
            age: None,
            sex: None,
            location: None,
            conditions: None,
            health_data: None,
            last_health_update: None,
        };

        match &self.pool {
            Some(pool) => {
                if DatabaseStorage::user_by_email(pool, &user.email)?.is_some() {
                    return Err(RepositoryError::Conflict(format!(
                        "email {} already registered",
                        user.email
                    )));
                }
                DatabaseStorage::insert_user(pool, &user)?;
            }
            None => {
                debug!("Storing user in memory: {}", user.id);
                self.storage.insert_user(&user)?;
            }
        }

        info!("Created user {}", user.id);
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::user_by_id(pool, &id.to_string()),
            None => self.storage.user_by_id(&id.to_string()),
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let email = email.trim();
        match &self.pool {
            Some(pool) => DatabaseStorage::user_by_email(pool, email),
            None => self.storage.user_by_email(email),
        }
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdateRecord) -> Result<UserRecord, RepositoryError> {
        let id = id.to_string();
        match &self.pool {
            Some(pool) => {
                if DatabaseStorage::update_profile(pool, &id, &update)? == 0 {
                    return Err(RepositoryError::NotFound(format!("user {}", id)));
                }
                self.reload(&id)
            }
            None => self.storage.update_user(&id, |user| {
                user.age = update.age;
                user.sex = update.sex;
                user.location = update.location;
                user.conditions = update.conditions;
            }),
        }
    }

    async fn update_health_data(
        &self,
        id: Uuid,
        health_data: serde_json::Value,
    ) -> Result<UserRecord, RepositoryError> {
        let id = id.to_string();
        let updated_at = Utc::now().to_rfc3339();
        match &self.pool {
            Some(pool) => {
                if DatabaseStorage::update_health_data(pool, &id, &health_data, &updated_at)? == 0 {
                    return Err(RepositoryError::NotFound(format!("user {}", id)));
                }
                self.reload(&id)
            }
            None => self.storage.update_user(&id, |user| {
                user.health_data = Some(health_data);
                user.last_health_update = Some(updated_at);
            }),
        }
    }
}

/// Mock user repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of UserRepository for testing.
    ///
    /// Keeps users in a vector and can be told to fail every call.
    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<Vec<UserRecord>>,
        fail_with: Option<String>,
    }

    impl MockUserRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined users
        pub fn with_users(users: Vec<UserRecord>) -> Self {
            Self {
                users: Mutex::new(users),
                fail_with: None,
            }
        }

        /// Create a mock repository whose calls all fail with a database error
        pub fn failing(message: &str) -> Self {
            Self {
                users: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            match &self.fail_with {
                Some(message) => Err(RepositoryError::Database(
                    crate::database::DatabaseError::GenericError(message.clone()),
                )),
                None => Ok(()),
            }
        }

        fn update<F: FnOnce(&mut UserRecord)>(&self, id: Uuid, apply: F) -> Result<UserRecord, RepositoryError> {
            self.check()?;
            let mut users = self.users.lock()?;
            let user = users
                .iter_mut()
                .find(|u| u.id == id.to_string())
                .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;
            apply(user);
            Ok(user.clone())
        }
    }

    /// Build a user record with sensible defaults
    pub fn sample_user(username: &str, email: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            created_at: Utc::now().to_rfc3339(),
            age: None,
            sex: None,
            location: None,
            conditions: None,
            health_data: None,
            last_health_update: None,
        }
    }

    #[async_trait]
    impl UserRepositoryTrait for MockUserRepository {
        async fn create(&self, request: CreateUserRecord) -> Result<UserRecord, RepositoryError> {
            self.check()?;
            let mut users = self.users.lock()?;
            if users.iter().any(|u| u.email.eq_ignore_ascii_case(&request.email)) {
                return Err(RepositoryError::Conflict(format!("email {} already registered", request.email)));
            }
            let mut user = sample_user(&request.username, &request.email);
            user.password_hash = request.password_hash;
            users.push(user.clone());
            Ok(user)
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError> {
            self.check()?;
            let users = self.users.lock()?;
            Ok(users.iter().find(|u| u.id == id.to_string()).cloned())
        }

        async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
            self.check()?;
            let users = self.users.lock()?;
            Ok(users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
        }

        async fn update_profile(&self, id: Uuid, update: ProfileUpdateRecord) -> Result<UserRecord, RepositoryError> {
            self.update(id, |user| {
                user.age = update.age;
                user.sex = update.sex;
                user.location = update.location;
                user.conditions = update.conditions;
            })
        }

        async fn update_health_data(
            &self,
            id: Uuid,
            health_data: serde_json::Value,
        ) -> Result<UserRecord, RepositoryError> {
            self.update(id, |user| {
                user.health_data = Some(health_data);
                user.last_health_update = Some(Utc::now().to_rfc3339());
            })
        }
    }

    #[cfg(test)]
    mod repository_tests {
        use super::*;
        use crate::database::{initialize_database_pool, DatabaseConfig};

        fn sqlite_repository() -> UserRepository {
            let pool = initialize_database_pool(&DatabaseConfig::sqlite_in_memory()).unwrap();
            UserRepository::new(pool)
        }

        fn request(username: &str, email: &str) -> CreateUserRecord {
            CreateUserRecord {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
            }
        }

        #[tokio::test]
        async fn test_create_and_lookup_in_memory() {
            let repo = UserRepository::in_memory();
            let user = repo.create(request("alice", "alice@example.com")).await.unwrap();

            let id = Uuid::parse_str(&user.id).unwrap();
            assert_eq!(repo.get_by_id(id).await.unwrap(), Some(user.clone()));
            assert_eq!(repo.get_by_email("ALICE@example.com").await.unwrap(), Some(user));
        }

        #[tokio::test]
        async fn test_duplicate_email_is_conflict() {
            for repo in [UserRepository::in_memory(), sqlite_repository()] {
                repo.create(request("alice", "alice@example.com")).await.unwrap();
                let err = repo.create(request("alice2", "alice@example.com")).await.unwrap_err();
                assert!(matches!(err, RepositoryError::Conflict(_)));
            }
        }

        #[tokio::test]
        async fn test_duplicate_username_is_conflict_in_sqlite() {
            let repo = sqlite_repository();
            repo.create(request("alice", "a@example.com")).await.unwrap();
            let err = repo.create(request("alice", "b@example.com")).await.unwrap_err();
            assert!(matches!(err, RepositoryError::Conflict(_)));
        }

        #[tokio::test]
        async fn test_profile_and_health_data_round_trip_in_sqlite() {
            let repo = sqlite_repository();
            let user = repo.create(request("bob", "bob@example.com")).await.unwrap();
            let id = Uuid::parse_str(&user.id).unwrap();

            let updated = repo
                .update_profile(
                    id,
                    ProfileUpdateRecord {
                        age: Some(52),
                        sex: Some("male".to_string()),
                        location: Some("Lyon".to_string()),
                        conditions: None,
                    },
                )
                .await
                .unwrap();
            assert_eq!(updated.age, Some(52));
            assert_eq!(updated.sex.as_deref(), Some("male"));

            let data = serde_json::json!({"lifestyle": {"smoking_status": "current"}});
            let updated = repo.update_health_data(id, data.clone()).await.unwrap();
            assert_eq!(updated.health_data, Some(data));
            assert!(updated.last_health_update.is_some());
        }

        #[tokio::test]
        async fn test_update_unknown_user_is_not_found() {
            for repo in [UserRepository::in_memory(), sqlite_repository()] {
                let err = repo
                    .update_profile(Uuid::new_v4(), ProfileUpdateRecord::default())
                    .await
                    .unwrap_err();
                assert!(matches!(err, RepositoryError::NotFound(_)));
            }
        }

        #[tokio::test]
        async fn test_failing_mock_reports_database_error() {
            let repo = MockUserRepository::failing("boom");
            let err = repo.get_by_email("x@example.com").await.unwrap_err();
            assert!(matches!(err, RepositoryError::Database(_)));
        }
    }
}
