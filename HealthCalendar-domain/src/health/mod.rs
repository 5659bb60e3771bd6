//! Domain layer health check functionality

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use health_calendar_data::database::{get_connection_info, DatabasePool};

use crate::services::guidelines::GuidelineCatalog;

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// A health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Component name to health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the storage backend.
    ///
    /// Returns an error when the database cannot be reached at all.
    async fn check_database_status(&self) -> Result<String, String>;
}

/// Health checks over the storage backend and the guideline catalog
#[derive(Debug, Clone)]
pub struct HealthService {
    pool: Option<DatabasePool>,
    catalog: Arc<GuidelineCatalog>,
}

impl HealthService {
    pub fn new(pool: Option<DatabasePool>, catalog: Arc<GuidelineCatalog>) -> Self {
        Self { pool, catalog }
    }

    fn guideline_component(&self) -> HealthComponent {
        let set = self.catalog.set();
        if set.guidelines.is_empty() {
            HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("No guidelines loaded".to_string()),
            }
        } else {
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(format!(
                    "{} guidelines from {} (updated {})",
                    set.guidelines.len(),
                    set.source,
                    set.last_updated
                )),
            }
        }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let db_component = match self.check_database_status().await {
            Ok(info) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(info),
            },
            Err(e) => {
                warn!("Database health check failed: {}", e);
                HealthComponent {
                    status: ComponentStatus::Unhealthy,
                    details: Some(e),
                }
            }
        };
        let guideline_component = self.guideline_component();

        let status = overall_status(&[db_component.status, guideline_component.status]);

        SystemHealth {
            status,
            components: vec![
                ("database".to_string(), db_component),
                ("guidelines".to_string(), guideline_component),
            ]
            .into_iter()
            .collect(),
        }
    }

    async fn check_database_status(&self) -> Result<String, String> {
        match &self.pool {
            Some(pool) => get_connection_info(pool).map_err(|e| format!("Database connection error: {}", e)),
            None => Ok("In-memory storage".to_string()),
        }
    }
}

/// Worst component status wins
fn overall_status(components: &[ComponentStatus]) -> SystemStatus {
    if components.contains(&ComponentStatus::Unhealthy) {
        SystemStatus::Unhealthy
    } else if components.contains(&ComponentStatus::Degraded) {
        SystemStatus::Degraded
    } else {
        SystemStatus::Healthy
    }
}
