// Testing utilities for the domain layer
// Only available when the "mock" feature is enabled

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub use health_calendar_data::repository::tests::{sample_reminder, sample_user, MockReminderRepository, MockUserRepository};

use crate::auth::token::{JwtConfig, TokenService};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};

/// Token service signed with the fixed test configuration
pub fn test_token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(JwtConfig::for_tests()))
}

/// Health service whose database status is set by the test
#[derive(Debug, Clone)]
pub struct MockHealthService {
    database_status: ComponentStatus,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// A healthy mock
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
        }
    }

    /// Report the database with the given status
    pub fn with_database_status(mut self, status: ComponentStatus) -> Self {
        self.database_status = status;
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let status = match self.database_status {
            ComponentStatus::Healthy => SystemStatus::Healthy,
            ComponentStatus::Degraded => SystemStatus::Degraded,
            ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
        };

        let mut components = HashMap::new();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status,
                details: self.check_database_status().await.err(),
            },
        );

        SystemHealth { status, components }
    }

    async fn check_database_status(&self) -> Result<String, String> {
        match self.database_status {
            ComponentStatus::Unhealthy => Err("Mock database is down".to_string()),
            _ => Ok("Mock database".to_string()),
        }
    }
}
