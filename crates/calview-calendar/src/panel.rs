//! Event description panel with auto-hide.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::host::Host;
use crate::schedule::Debouncer;
use crate::source::{is_live, LiveGeneration};
use crate::types::EventRecord;

pub const NO_DESCRIPTION: &str = "No description available.";

/// Auxiliary panel that shows the description of a clicked event and hides
/// itself after a delay. Each new click restarts the delay.
pub struct DescriptionPanel {
    host: Arc<dyn Host>,
    hide_timer: Debouncer,
}

impl DescriptionPanel {
    pub fn new(host: Arc<dyn Host>, runtime: Handle, hide_after: Duration) -> Self {
        Self {
            host,
            hide_timer: Debouncer::new(runtime, hide_after),
        }
    }

    /// Show the description of `event`. `false` when the page has no panel.
    pub fn show_event(&self, event: &EventRecord) -> bool {
        let text = event.description().unwrap_or(NO_DESCRIPTION);

        if !self.host.show_description(text) {
            tracing::debug!(event_id = %event.id, "Description panel not present on page");
            return false;
        }

        let host = self.host.clone();
        self.hide_timer.schedule(move || host.hide_description());
        true
    }

    /// Hide right away.
    pub fn dismiss(&self) {
        self.hide_timer.cancel();
        self.host.hide_description();
    }

    /// Hide only if a description is currently showing.
    pub fn reset(&self) {
        if self.hide_timer.cancel() {
            self.host.hide_description();
        }
    }

    pub fn is_showing(&self) -> bool {
        self.hide_timer.is_pending()
    }
}

/// Event-click callback bound to one calendar instance.
#[derive(Clone)]
pub struct EventClickHandler {
    panel: Arc<DescriptionPanel>,
    generation: u64,
    live: LiveGeneration,
}

impl EventClickHandler {
    pub(crate) fn new(panel: Arc<DescriptionPanel>, generation: u64, live: LiveGeneration) -> Self {
        Self {
            panel,
            generation,
            live,
        }
    }

    /// Called by the rendering library when an event is activated.
    pub fn handle(&self, event: &EventRecord) -> bool {
        if !is_live(&self.live, self.generation) {
            tracing::debug!(event_id = %event.id, "Ignoring click from a destroyed calendar");
            return false;
        }
        self.panel.show_event(event)
    }
}

impl std::fmt::Debug for EventClickHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventClickHandler")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
