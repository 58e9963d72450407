use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Calendar widget and event endpoint settings
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Viewport breakpoints for the responsive layout
    #[serde(default)]
    pub viewport: ViewportSettings,

    /// Log filter settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Id of the element the calendar is mounted into
    #[serde(default = "default_container_id")]
    pub container_id: String,

    /// Base URL that relative event endpoints are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Event data endpoint, used when the container carries no override
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Fetch retry policy
    #[serde(default)]
    pub retry: RetrySettings,

    /// Quiet period before a resize is evaluated
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,

    /// How long an event description stays visible after a click
    #[serde(default = "default_description_hide_ms")]
    pub description_hide_ms: u64,
}

fn default_container_id() -> String {
    "calendar".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_endpoint() -> String {
    "/api/events/data".to_string()
}

fn default_resize_debounce_ms() -> u64 {
    250
}

fn default_description_hide_ms() -> u64 {
    5000
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            container_id: default_container_id(),
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            retry: RetrySettings::default(),
            resize_debounce_ms: default_resize_debounce_ms(),
            description_hide_ms: default_description_hide_ms(),
        }
    }
}

/// Retry settings for event fetches.
///
/// Retry `n` waits `n * base_delay_ms` (linear backoff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Additional attempts after the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay unit between attempts
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Narrowest width that gets the tablet layout
    #[serde(default = "default_tablet_min_width")]
    pub tablet_min_width: u32,
    /// Narrowest width that gets the desktop layout
    #[serde(default = "default_desktop_min_width")]
    pub desktop_min_width: u32,
}

fn default_tablet_min_width() -> u32 {
    768
}

fn default_desktop_min_width() -> u32 {
    1024
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            tablet_min_width: default_tablet_min_width(),
            desktop_min_width: default_desktop_min_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file, writing defaults if it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(config_path: Option<&Path>) -> Result<(Self, ValidationResult), ConfigError> {
        let config = match config_path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.calendar.base_url, "calendar.base_url", &mut result);

        if self.calendar.container_id.trim().is_empty() {
            result.add_error("calendar.container_id", "Container id must not be empty");
        }

        if self.calendar.endpoint.trim().is_empty() {
            result.add_error("calendar.endpoint", "Endpoint must not be empty");
        }

        if self.calendar.retry.base_delay_ms == 0 && self.calendar.retry.max_retries > 0 {
            result.add_warning(
                "calendar.retry.base_delay_ms",
                "Retries will fire back-to-back (0 ms delay)",
            );
        } else if self.calendar.retry.max_retries > 10 {
            result.add_warning(
                "calendar.retry.max_retries",
                "More than 10 retries per range request",
            );
        }

        if self.calendar.resize_debounce_ms == 0 {
            result.add_warning(
                "calendar.resize_debounce_ms",
                "Resize debounce disabled; every resize event reconfigures the calendar",
            );
        }

        if self.calendar.description_hide_ms == 0 {
            result.add_error(
                "calendar.description_hide_ms",
                "Description panel would hide immediately",
            );
        }

        if self.viewport.tablet_min_width == 0 {
            result.add_error("viewport.tablet_min_width", "Breakpoint must be greater than 0");
        }
        if self.viewport.desktop_min_width <= self.viewport.tablet_min_width {
            result.add_error(
                "viewport.desktop_min_width",
                "Desktop breakpoint must be greater than the tablet breakpoint",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                // Check scheme
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                // Check host
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let contents = toml::to_string_pretty(self)?;

        std::fs::write(config_path, contents).map_err(|source| ConfigError::Write {
            path: config_path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("calview");

        Ok(config_dir.join("config.toml"))
    }
}
