//! Refresh the local guideline file from `GUIDELINES_REMOTE_URL`.
//!
//! When the download fails, or no URL is configured, the built-in set is
//! written if no local file exists yet and the process exits with status 1.

use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use dotenv::dotenv;
use tracing::{error, info, warn};

use health_calendar_api::config::AppConfig;
use health_calendar_api::telemetry::init_tracing;
use health_calendar_domain::services::GuidelineUpdater;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let today = Utc::now().date_naive();

    if let Some(parent) = config.guidelines_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let remote_url = config.guidelines_remote_url.clone().unwrap_or_default();
    let updater = GuidelineUpdater::new(remote_url, config.guidelines_path.clone())
        .context("failed to build HTTP client")?;

    if config.guidelines_remote_url.is_none() {
        warn!("GUIDELINES_REMOTE_URL is not set");
        fall_back(&updater, today)?;
        return Ok(ExitCode::FAILURE);
    }

    match updater.update(today).await {
        Ok(set) => {
            info!(
                "Wrote {} guidelines to {}",
                set.guidelines.len(),
                updater.local_path().display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Error updating guidelines: {}", e);
            fall_back(&updater, today)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn fall_back(updater: &GuidelineUpdater, today: chrono::NaiveDate) -> anyhow::Result<()> {
    if updater
        .ensure_local_file(today)
        .context("failed to write default guidelines")?
    {
        info!("Default guidelines written to {}", updater.local_path().display());
    } else {
        info!("Keeping existing guidelines at {}", updater.local_path().display());
    }
    Ok(())
}
