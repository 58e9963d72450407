//! Terminal stand-ins for the page and the rendering library.

use std::collections::BTreeMap;

use calview_calendar::{
    CalendarBackend, CalendarError, CalendarOptions, CalendarWidget, ContainerInfo, DateRange, ErrorAffordance,
    EventRecord, EventSink, Host, HostSignal, SignalHandler, SignalKind, SignalRegistry, SubscriptionId,
    ToolbarLayout, ViewKind,
};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// A page holding one calendar container and a schedule form.
pub struct ConsoleHost {
    registry: SignalRegistry,
    container: ContainerInfo,
    width: u32,
    fields: Mutex<BTreeMap<String, String>>,
}

impl ConsoleHost {
    pub fn new(container: ContainerInfo, width: u32) -> Self {
        let fields = ["start", "end"]
            .into_iter()
            .map(|name| (name.to_string(), String::new()))
            .collect();

        Self {
            registry: SignalRegistry::new(),
            container,
            width,
            fields: Mutex::new(fields),
        }
    }

    pub fn emit(&self, signal: &HostSignal) {
        let handled = self.registry.emit(signal);
        tracing::debug!(?signal, handled, "Signal emitted");
    }

    pub fn fields(&self) -> BTreeMap<String, String> {
        self.fields.lock().clone()
    }
}

impl Host for ConsoleHost {
    fn container(&self, id: &str) -> Option<ContainerInfo> {
        (self.container.id == id).then(|| self.container.clone())
    }

    fn viewport_width(&self) -> u32 {
        self.width
    }

    fn show_loading(&self, container_id: &str) {
        println!("[{}] Loading calendar...", container_id);
    }

    fn show_error(&self, container_id: &str, affordance: &ErrorAffordance) {
        eprintln!("[{}] {} [{}]", container_id, affordance.message, affordance.action_label);
    }

    fn clear_placeholder(&self, container_id: &str) {
        tracing::debug!(container_id, "Placeholder cleared");
    }

    fn show_description(&self, text: &str) -> bool {
        println!("  > {}", text);
        true
    }

    fn hide_description(&self) {}

    fn set_field_value(&self, name: &str, value: &str) -> bool {
        match self.fields.lock().get_mut(name) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }

    fn subscribe(&self, kind: SignalKind, handler: SignalHandler) -> SubscriptionId {
        self.registry.subscribe(kind, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.registry.unsubscribe(id);
    }
}

pub type LoadOutcome = Result<Vec<EventRecord>, CalendarError>;

/// Renders a text header and loads one fixed range.
pub struct ConsoleBackend {
    range: DateRange,
    outcomes: mpsc::UnboundedSender<LoadOutcome>,
}

impl ConsoleBackend {
    pub fn new(range: DateRange, outcomes: mpsc::UnboundedSender<LoadOutcome>) -> Self {
        Self { range, outcomes }
    }
}

impl CalendarBackend for ConsoleBackend {
    fn is_loaded(&self) -> bool {
        true
    }

    fn create(
        &self,
        container: &ContainerInfo,
        options: CalendarOptions,
    ) -> Result<Box<dyn CalendarWidget>, CalendarError> {
        tracing::debug!(container_id = %container.id, generation = options.events.generation(), "Creating console calendar");

        Ok(Box::new(ConsoleWidget {
            view: options.initial_view,
            options,
            range: self.range,
            outcomes: self.outcomes.clone(),
        }))
    }
}

struct ConsoleWidget {
    options: CalendarOptions,
    view: ViewKind,
    range: DateRange,
    outcomes: mpsc::UnboundedSender<LoadOutcome>,
}

impl CalendarWidget for ConsoleWidget {
    fn render(&mut self) -> Result<(), CalendarError> {
        let toolbar = &self.options.toolbar;
        println!(
            "{} | {} | {}",
            ToolbarLayout::section_notation(&toolbar.left),
            ToolbarLayout::section_notation(&toolbar.center),
            ToolbarLayout::section_notation(&toolbar.right),
        );
        println!("View: {}  Range: {}", self.view, self.range);

        self.options.events.request(
            self.range,
            Box::new(ChannelSink {
                outcomes: self.outcomes.clone(),
            }),
        );
        Ok(())
    }

    fn destroy(&mut self) {
        tracing::debug!(generation = self.options.events.generation(), "Console calendar destroyed");
    }

    fn change_view(&mut self, view: ViewKind) {
        self.view = view;
    }

    fn update_size(&mut self) {}

    fn view_type(&self) -> ViewKind {
        self.view
    }
}

struct ChannelSink {
    outcomes: mpsc::UnboundedSender<LoadOutcome>,
}

impl ChannelSink {
    fn send(self, outcome: LoadOutcome) {
        if self.outcomes.send(outcome).is_err() {
            tracing::debug!("Nobody is waiting for events anymore");
        }
    }
}

impl EventSink for ChannelSink {
    fn success(self: Box<Self>, events: Vec<EventRecord>) {
        self.send(Ok(events));
    }

    fn failure(self: Box<Self>, error: CalendarError) {
        self.send(Err(error));
    }
}
