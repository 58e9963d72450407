//! Rendering library contract.
//!
//! The grid itself (layout, drag/drop, recurrence, time zones) belongs to the
//! library behind these traits; the controller only configures and drives it.

use crate::error::CalendarError;
use crate::host::ContainerInfo;
use crate::panel::EventClickHandler;
use crate::responsive::ViewportConfig;
use crate::source::EventSource;
use crate::types::{ToolbarLayout, ViewKind};

/// Labels of the header buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonText {
    pub today: String,
    pub month: String,
    pub week: String,
    pub list: String,
}

impl Default for ButtonText {
    fn default() -> Self {
        Self {
            today: "Today".to_string(),
            month: "Month".to_string(),
            week: "Week".to_string(),
            list: "List".to_string(),
        }
    }
}

/// How overflowing "+N more" links open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoreLinkAction {
    #[default]
    Popover,
    Day,
}

/// Presentation options passed through to the library unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    /// `block` renders events as filled bars
    pub event_display: String,
    pub event_color: String,
    pub event_text_color: String,
    pub more_link: MoreLinkAction,
    pub button_text: ButtonText,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            event_display: "block".to_string(),
            event_color: "#C8A349".to_string(),
            event_text_color: "#000000".to_string(),
            more_link: MoreLinkAction::Popover,
            button_text: ButtonText::default(),
        }
    }
}

/// Everything a calendar instance is constructed with.
#[derive(Debug, Clone)]
pub struct CalendarOptions {
    pub initial_view: ViewKind,
    pub toolbar: ToolbarLayout,
    /// `None` means unlimited
    pub max_events_per_cell: Option<u32>,
    pub aspect_ratio: f32,
    pub display: DisplayOptions,
    pub events: EventSource,
    pub on_event_click: EventClickHandler,
}

impl CalendarOptions {
    pub fn new(
        viewport: &ViewportConfig,
        display: DisplayOptions,
        events: EventSource,
        on_event_click: EventClickHandler,
    ) -> Self {
        Self {
            initial_view: viewport.initial_view,
            toolbar: viewport.toolbar.clone(),
            max_events_per_cell: viewport.max_events_per_cell,
            aspect_ratio: viewport.aspect_ratio,
            display,
            events,
            on_event_click,
        }
    }
}

/// Entry point of the rendering library.
pub trait CalendarBackend: Send + Sync {
    /// Whether the library is available at all.
    fn is_loaded(&self) -> bool;

    /// Construct an instance bound to `container`. Nothing is drawn until
    /// [`CalendarWidget::render`].
    ///
    /// # Errors
    /// [`CalendarError::Render`] when construction fails.
    fn create(
        &self,
        container: &ContainerInfo,
        options: CalendarOptions,
    ) -> Result<Box<dyn CalendarWidget>, CalendarError>;
}

/// One live binding of the library to a container.
pub trait CalendarWidget: Send {
    /// # Errors
    /// [`CalendarError::Render`] when drawing fails.
    fn render(&mut self) -> Result<(), CalendarError>;

    fn destroy(&mut self);

    fn change_view(&mut self, view: ViewKind);

    fn update_size(&mut self);

    fn view_type(&self) -> ViewKind;
}
