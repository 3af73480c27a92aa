use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingSettings;
use crate::error::AppError;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), AppError> {
    let filter = build_filter(&settings.level);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match settings.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).try_init(),
    };
    installed.map_err(|e| AppError::InternalError(format!("failed to install logger: {}", e)))?;

    info!(level = %settings.level, format = %settings.format, "Logging initialized");
    Ok(())
}

fn build_filter(level: &str) -> EnvFilter {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("defi_position_monitor={}", level)))
}
