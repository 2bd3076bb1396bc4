use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level
/// so a session can be debugged without touching the environment file.
pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.telemetry().log_level.clone()));

    // Plain output shares stdout with the question renderer; JSON is for
    // running under a log collector.
    let result = if settings.telemetry().json {
        fmt().with_env_filter(filter).with_target(false).json().try_init()
    } else {
        fmt().with_env_filter(filter).with_target(false).with_ansi(true).try_init()
    };

    result.map_err(|err| anyhow::anyhow!(err.to_string()))
}
