use std::sync::Arc;

use health_calendar_data::database::DatabasePool;
use health_calendar_data::repository::{ReminderRepository, UserRepository};
use health_calendar_domain::auth::token::TokenService;
use health_calendar_domain::health::{HealthService, HealthServiceTrait};
use health_calendar_domain::services::{
    create_profile_service, create_reminder_service, create_user_service, GuidelineCatalog, ProfileServiceTrait,
    ReminderServiceTrait, UserServiceTrait,
};

/// Services shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserServiceTrait + Send + Sync>,
    pub profiles: Arc<dyn ProfileServiceTrait + Send + Sync>,
    pub reminders: Arc<dyn ReminderServiceTrait + Send + Sync>,
    pub health: Arc<dyn HealthServiceTrait + Send + Sync>,
    pub catalog: Arc<GuidelineCatalog>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wire the services over the given storage.
    ///
    /// `None` keeps all records in process memory.
    pub fn new(pool: Option<DatabasePool>, catalog: Arc<GuidelineCatalog>, tokens: Arc<TokenService>) -> Self {
        let users = UserRepository::new(pool.clone());
        let reminders = ReminderRepository::new(pool.clone());

        Self {
            users: Arc::new(create_user_service(users.clone(), tokens.clone())),
            profiles: Arc::new(create_profile_service(users, catalog.clone())),
            reminders: Arc::new(create_reminder_service(reminders)),
            health: Arc::new(HealthService::new(pool, catalog.clone())),
            catalog,
            tokens,
        }
    }

    /// Replace the health service, for tests
    pub fn with_health_service(mut self, health: Arc<dyn HealthServiceTrait + Send + Sync>) -> Self {
        self.health = health;
        self
    }
}
