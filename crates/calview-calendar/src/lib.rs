//! Calendar view controller.
//!
//! Fetches events with retry, picks a layout for the viewport and owns the
//! lifecycle of one calendar instance embedded in a page that swaps content
//! in place.

pub mod backend;
pub mod controller;
pub mod error;
pub mod fetcher;
pub mod form;
pub mod host;
pub mod panel;
pub mod responsive;
pub mod retry;
pub mod schedule;
pub mod source;
pub mod types;

pub use backend::{ButtonText, CalendarBackend, CalendarOptions, CalendarWidget, DisplayOptions, MoreLinkAction};
pub use controller::{CalendarController, ControllerSettings, LifecycleState};
pub use error::CalendarError;
pub use fetcher::{parse_events, EventFetcher, EventLoader};
pub use form::{prefill_schedule_fields, schedule_form_defaults};
pub use host::{
    ContainerInfo, ErrorAffordance, Host, HostSignal, SignalHandler, SignalKind, SignalRegistry, SubscriptionId,
};
pub use panel::{DescriptionPanel, EventClickHandler, NO_DESCRIPTION};
pub use responsive::{compute_viewport_config, compute_viewport_config_with, Breakpoints, DeviceClass, ViewportConfig};
pub use retry::{with_retry, RetryConfig};
pub use schedule::{Debouncer, ScheduledTask};
pub use source::{EventSink, EventSource};
pub use types::{DateRange, EventId, EventRecord, ToolbarItem, ToolbarLayout, ViewKind};
