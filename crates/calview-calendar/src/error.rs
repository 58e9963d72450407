//! Calendar-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Calendar rendering library is not loaded")]
    LibraryMissing,

    #[error("Calendar container not found: {0}")]
    ContainerMissing(String),

    #[error("Calendar render failed: {0}")]
    Render(String),

    #[error("Server returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<CalendarError>,
    },

    #[error("No async runtime available")]
    NoRuntime,
}

impl CalendarError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::LibraryMissing => {
                "The calendar could not be loaded. Please reload the page.".to_string()
            }
            Self::ContainerMissing(_) => "Calendar is not available on this page".to_string(),
            Self::Render(_) => "The calendar failed to display. Please reload the page.".to_string(),
            Self::Http { status, .. } if *status >= 500 => {
                "The events server is having trouble. Please try again later.".to_string()
            }
            Self::Http { status, .. } => format!("Events could not be loaded (HTTP {})", status),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::InvalidResponse(_) => "Received unexpected event data".to_string(),
            Self::InvalidUrl(_) => "The events address is misconfigured".to_string(),
            Self::InvalidRange(_) => "Invalid date range".to_string(),
            Self::RetriesExhausted { last, .. } => last.user_message(),
            Self::NoRuntime => "Calendar service not initialized".to_string(),
        }
    }

    /// Whether another attempt at the same request may succeed.
    ///
    /// Every non-success status and every transport failure qualifies.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Network(_))
    }

    /// Whether this failure ends the current calendar instantiation.
    pub fn is_fatal_for_instance(&self) -> bool {
        matches!(self, Self::LibraryMissing | Self::Render(_))
    }
}
