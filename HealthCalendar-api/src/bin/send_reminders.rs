//! One notification pass over reminders due soon.
//!
//! Meant to run from a scheduler such as cron. Exits non-zero when any
//! reminder could not be delivered.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use dotenv::dotenv;
use tracing::{error, info};

use health_calendar_api::api::AppState;
use health_calendar_api::config::AppConfig;
use health_calendar_api::telemetry::init_tracing;
use health_calendar_domain::auth::token::TokenService;
use health_calendar_domain::database::initialize_database_pool;
use health_calendar_domain::services::{GuidelineCatalog, LogNotifier, ReminderDispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let jwt = AppConfig::jwt().context("invalid JWT configuration")?;
    let pool = initialize_database_pool(&config.database).context("failed to initialize database")?;

    let today = Utc::now().date_naive();
    let catalog = GuidelineCatalog::load(&config.guidelines_path, today)
        .with_context(|| format!("failed to load guidelines from {}", config.guidelines_path.display()))?;
    let state = AppState::new(pool, Arc::new(catalog), Arc::new(TokenService::new(jwt)));

    let dispatcher = ReminderDispatcher::new(
        state.reminders.clone(),
        state.users.clone(),
        Arc::new(LogNotifier),
        config.reminder_window_days,
    );

    let summary = dispatcher.run_once(today).await.context("reminder pass failed")?;
    info!("Reminder pass finished: {} sent, {} failed", summary.sent, summary.failed);

    if summary.failed > 0 {
        error!("{} reminders could not be delivered", summary.failed);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
