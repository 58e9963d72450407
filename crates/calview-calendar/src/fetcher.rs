//! Event feed client with retry.

use async_trait::async_trait;
use calview_core::CalendarConfig;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::error::CalendarError;
use crate::retry::{with_retry, RetryConfig};
use crate::types::{DateRange, EventRecord};

/// Something that can produce the events of one range from an endpoint.
///
/// The controller only talks to this seam, so the HTTP client can be swapped
/// for a scripted loader in tests.
#[async_trait]
pub trait EventLoader: Send + Sync {
    /// Load the events of `range` from `endpoint`.
    ///
    /// # Errors
    /// Terminal failure after the loader's own recovery is spent.
    async fn load(&self, endpoint: &str, range: DateRange) -> Result<Vec<EventRecord>, CalendarError>;
}

/// HTTP client for the events endpoint.
#[derive(Debug, Clone)]
pub struct EventFetcher {
    client: reqwest::Client,
    base_url: Url,
    retry: RetryConfig,
}

impl EventFetcher {
    /// # Errors
    /// [`CalendarError::InvalidUrl`] when `base_url` does not parse.
    pub fn new(base_url: &str, retry: RetryConfig) -> Result<Self, CalendarError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CalendarError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            retry,
        })
    }

    /// # Errors
    /// [`CalendarError::InvalidUrl`] when the configured base URL does not parse.
    pub fn from_config(config: &CalendarConfig) -> Result<Self, CalendarError> {
        Self::new(&config.base_url, RetryConfig::from(config.retry))
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Build `<endpoint>?start=<iso>&end=<iso>`.
    ///
    /// `endpoint` may be absolute or relative to the base URL; a query string
    /// already on it is kept.
    ///
    /// # Errors
    /// [`CalendarError::InvalidUrl`] when the endpoint cannot be resolved.
    pub fn events_url(&self, endpoint: &str, range: &DateRange) -> Result<Url, CalendarError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| CalendarError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        url.query_pairs_mut()
            .append_pair("start", &range.start_param())
            .append_pair("end", &range.end_param());

        Ok(url)
    }

    /// Fetch and parse the events at `url`, retrying transport failures and
    /// non-success statuses.
    ///
    /// # Errors
    /// [`CalendarError::RetriesExhausted`] once every attempt failed, or
    /// [`CalendarError::InvalidResponse`] when the body is not JSON.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_events(&self, url: &Url) -> Result<Vec<EventRecord>, CalendarError> {
        let body = with_retry(&self.retry, url.as_str(), |attempt| {
            self.fetch_body(url, attempt)
        })
        .await?;

        parse_events(&body)
    }

    async fn fetch_body(&self, url: &Url, attempt: u32) -> Result<String, CalendarError> {
        tracing::debug!(attempt, "Requesting events");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(CalendarError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl EventLoader for EventFetcher {
    async fn load(&self, endpoint: &str, range: DateRange) -> Result<Vec<EventRecord>, CalendarError> {
        let url = self.events_url(endpoint, &range)?;

        match self.fetch_events(&url).await {
            Ok(events) => {
                tracing::debug!(endpoint, %range, count = events.len(), "Loaded events");
                Ok(events)
            }
            Err(e) => {
                tracing::error!(endpoint, %range, error = %e, "Failed to fetch events");
                Err(e)
            }
        }
    }
}

/// Parse an events body.
///
/// Anything other than a JSON array degrades to an empty list. Array entries
/// that are not event records are skipped.
///
/// # Errors
/// [`CalendarError::InvalidResponse`] when `body` is not JSON at all.
pub fn parse_events(body: &str) -> Result<Vec<EventRecord>, CalendarError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| CalendarError::InvalidResponse(format!("JSON parse error: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            tracing::warn!(kind = json_kind(&other), "Invalid events data, expected an array");
            return Ok(Vec::new());
        }
    };

    let events = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<EventRecord>(item) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed event entry");
                None
            }
        })
        .collect();

    Ok(events)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
