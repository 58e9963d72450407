pub mod config;
pub mod error;

pub use config::{
    CalendarConfig, Config, ConfigValidationError, LoggingConfig, RetrySettings,
    ValidationResult, ViewportSettings,
};
pub use error::ConfigError;

/// Initialize tracing/logging.
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` is used.
/// Safe to call more than once.
pub fn init(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .try_init();

    tracing::debug!("Calview logging initialized");
}
