pub(crate) mod core;
pub(crate) mod schemas;
pub(crate) mod services;
pub(crate) mod session;
pub(crate) mod ui;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;

use crate::core::{config::Settings, telemetry};
use crate::services::attempt_api::{AttemptService, HttpAttemptService};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;

    let assessment_id = std::env::args()
        .nth(1)
        .context("usage: examforge-client <assessment-id>")?
        .parse::<i64>()
        .context("assessment id must be an integer")?;

    let service: Arc<dyn AttemptService> = Arc::new(HttpAttemptService::from_settings(&settings)?);

    tracing::info!(
        assessment_id,
        base_url = %settings.api().base_url,
        environment = %settings.runtime().environment.as_str(),
        "ExamForge attempt session starting"
    );

    tokio::select! {
        _ = core::shutdown::shutdown_signal() => {
            tracing::info!(assessment_id, "attempt session torn down before completion");
        }
        result = session::run_attempt(service, assessment_id) => result?,
    }

    Ok(())
}
