//! In-memory page, rendering library and loader for controller tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use calview_calendar::{
    CalendarBackend, CalendarError, CalendarOptions, CalendarWidget, ContainerInfo, DateRange, ErrorAffordance,
    EventClickHandler, EventLoader, EventRecord, EventSink, EventSource, Host, HostSignal, SignalHandler,
    SignalKind, SignalRegistry, SubscriptionId, ToolbarLayout, ViewKind,
};
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Loading(String),
    Error(String, ErrorAffordance),
    Cleared(String),
    ShowDescription(String),
    HideDescription,
}

/// Page with a configurable set of containers, an optional description panel
/// and optional form fields.
pub struct FakeHost {
    registry: SignalRegistry,
    containers: Mutex<HashMap<String, ContainerInfo>>,
    width: AtomicU32,
    has_panel: AtomicBool,
    fields: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<HostCall>>,
}

impl FakeHost {
    pub fn new(width: u32) -> Arc<Self> {
        Arc::new(Self {
            registry: SignalRegistry::new(),
            containers: Mutex::new(HashMap::new()),
            width: AtomicU32::new(width),
            has_panel: AtomicBool::new(true),
            fields: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn add_container(&self, container: ContainerInfo) {
        self.containers.lock().insert(container.id.clone(), container);
    }

    pub fn remove_container(&self, id: &str) {
        self.containers.lock().remove(id);
    }

    pub fn add_field(&self, name: &str) {
        self.fields.lock().insert(name.to_string(), String::new());
    }

    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.lock().get(name).cloned()
    }

    pub fn remove_panel(&self) {
        self.has_panel.store(false, Ordering::SeqCst);
    }

    pub fn set_width(&self, width: u32) {
        self.width.store(width, Ordering::SeqCst);
    }

    /// Change the width and emit the resize signal.
    pub fn resize(&self, width: u32) {
        self.set_width(width);
        self.emit(HostSignal::Resized(width));
    }

    pub fn emit(&self, signal: HostSignal) -> usize {
        self.registry.emit(&signal)
    }

    pub fn subscribers(&self, kind: SignalKind) -> usize {
        self.registry.count(kind)
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::ShowDescription(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn hide_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == HostCall::HideDescription)
            .count()
    }

    pub fn errors(&self) -> Vec<(String, ErrorAffordance)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Error(id, affordance) => Some((id, affordance)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }
}

impl Host for FakeHost {
    fn container(&self, id: &str) -> Option<ContainerInfo> {
        self.containers.lock().get(id).cloned()
    }

    fn viewport_width(&self) -> u32 {
        self.width.load(Ordering::SeqCst)
    }

    fn show_loading(&self, container_id: &str) {
        self.record(HostCall::Loading(container_id.to_string()));
    }

    fn show_error(&self, container_id: &str, affordance: &ErrorAffordance) {
        self.record(HostCall::Error(container_id.to_string(), affordance.clone()));
    }

    fn clear_placeholder(&self, container_id: &str) {
        self.record(HostCall::Cleared(container_id.to_string()));
    }

    fn show_description(&self, text: &str) -> bool {
        if !self.has_panel.load(Ordering::SeqCst) {
            return false;
        }
        self.record(HostCall::ShowDescription(text.to_string()));
        true
    }

    fn hide_description(&self) {
        if self.has_panel.load(Ordering::SeqCst) {
            self.record(HostCall::HideDescription);
        }
    }

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

/// What the fake rendering library observed for one instance.
#[derive(Debug, Clone)]
pub struct WidgetRecord {
    pub container_id: String,
    pub generation: u64,
    pub endpoint: String,
    pub initial_view: ViewKind,
    pub toolbar: ToolbarLayout,
    pub max_events_per_cell: Option<u32>,
    pub aspect_ratio: f32,
    pub current_view: ViewKind,
    pub rendered: bool,
    pub destroyed: bool,
    pub view_changes: Vec<ViewKind>,
    pub size_updates: u32,
    /// Events displayed, per successful range
    pub displayed: Vec<Vec<EventRecord>>,
    pub failures: Vec<String>,
}

type Records = Arc<Mutex<Vec<WidgetRecord>>>;

struct Callbacks {
    events: EventSource,
    on_click: EventClickHandler,
}

/// Rendering library fake. Each rendered instance immediately requests
/// [`FakeBackend::initial_range`].
pub struct FakeBackend {
    loaded: AtomicBool,
    fail_render: AtomicBool,
    records: Records,
    callbacks: Mutex<Vec<Callbacks>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            loaded: AtomicBool::new(true),
            fail_render: AtomicBool::new(false),
            records: Arc::new(Mutex::new(Vec::new())),
            callbacks: Mutex::new(Vec::new()),
        })
    }

    pub fn initial_range() -> DateRange {
        DateRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::SeqCst);
    }

    pub fn set_fail_render(&self, fail: bool) {
        self.fail_render.store(fail, Ordering::SeqCst);
    }

    pub fn widgets(&self) -> Vec<WidgetRecord> {
        self.records.lock().clone()
    }

    pub fn widget(&self, index: usize) -> WidgetRecord {
        self.records.lock()[index].clone()
    }

    /// Instances created and not destroyed.
    pub fn live_count(&self) -> usize {
        self.records.lock().iter().filter(|w| !w.destroyed).count()
    }

    /// Request `range` through the data source of instance `index`, the way
    /// the library does on navigation.
    pub fn request(&self, index: usize, range: DateRange) -> JoinHandle<()> {
        let events = self.callbacks.lock()[index].events.clone();
        events.request(range, recording_sink(&self.records, index))
    }

    /// Click `event` in instance `index`.
    pub fn click(&self, index: usize, event: &EventRecord) -> bool {
        let handler = self.callbacks.lock()[index].on_click.clone();
        handler.handle(event)
    }
}

impl CalendarBackend for FakeBackend {
    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn create(
        &self,
        container: &ContainerInfo,
        options: CalendarOptions,
    ) -> Result<Box<dyn CalendarWidget>, CalendarError> {
        let mut records = self.records.lock();
        let index = records.len();
        records.push(WidgetRecord {
            container_id: container.id.clone(),
            generation: options.events.generation(),
            endpoint: options.events.endpoint().to_string(),
            initial_view: options.initial_view,
            toolbar: options.toolbar.clone(),
            max_events_per_cell: options.max_events_per_cell,
            aspect_ratio: options.aspect_ratio,
            current_view: options.initial_view,
            rendered: false,
            destroyed: false,
            view_changes: Vec::new(),
            size_updates: 0,
            displayed: Vec::new(),
            failures: Vec::new(),
        });

        self.callbacks.lock().push(Callbacks {
            events: options.events.clone(),
            on_click: options.on_event_click.clone(),
        });

        Ok(Box::new(FakeWidget {
            index,
            records: self.records.clone(),
            events: options.events,
            fail_render: self.fail_render.load(Ordering::SeqCst),
        }))
    }
}

struct FakeWidget {
    index: usize,
    records: Records,
    events: EventSource,
    fail_render: bool,
}

impl FakeWidget {
    fn update<F: FnOnce(&mut WidgetRecord)>(&self, f: F) {
        f(&mut self.records.lock()[self.index]);
    }
}

impl CalendarWidget for FakeWidget {
    fn render(&mut self) -> Result<(), CalendarError> {
        if self.fail_render {
            return Err(CalendarError::Render("canvas unavailable".to_string()));
        }
        self.update(|w| w.rendered = true);
        self.events
            .request(FakeBackend::initial_range(), recording_sink(&self.records, self.index));
        Ok(())
    }

    fn destroy(&mut self) {
        self.update(|w| w.destroyed = true);
    }

    fn change_view(&mut self, view: ViewKind) {
        self.update(|w| {
            w.current_view = view;
            w.view_changes.push(view);
        });
    }

    fn update_size(&mut self) {
        self.update(|w| w.size_updates += 1);
    }

    fn view_type(&self) -> ViewKind {
        self.records.lock()[self.index].current_view
    }
}

struct RecordingSink {
    records: Records,
    index: usize,
}

fn recording_sink(records: &Records, index: usize) -> Box<dyn EventSink> {
    Box::new(RecordingSink {
        records: records.clone(),
        index,
    })
}

impl EventSink for RecordingSink {
    fn success(self: Box<Self>, events: Vec<EventRecord>) {
        self.records.lock()[self.index].displayed.push(events);
    }

    fn failure(self: Box<Self>, error: CalendarError) {
        self.records.lock()[self.index].failures.push(error.to_string());
    }
}

/// Loader that replays queued results, then falls back to a fixed list.
pub struct ScriptedLoader {
    delay: Duration,
    default_events: Vec<EventRecord>,
    script: Mutex<VecDeque<Result<Vec<EventRecord>, CalendarError>>>,
    calls: Mutex<Vec<(String, DateRange)>>,
}

impl ScriptedLoader {
    pub fn new(default_events: Vec<EventRecord>) -> Arc<Self> {
        Self::with_delay(default_events, Duration::ZERO)
    }

    pub fn with_delay(default_events: Vec<EventRecord>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            default_events,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, result: Result<Vec<EventRecord>, CalendarError>) {
        self.script.lock().push_back(result);
    }

    pub fn calls(&self) -> Vec<(String, DateRange)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EventLoader for ScriptedLoader {
    async fn load(&self, endpoint: &str, range: DateRange) -> Result<Vec<EventRecord>, CalendarError> {
        self.calls.lock().push((endpoint.to_string(), range));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(self.default_events.clone()))
    }
}

/// The single event of the morning-shift fixture.
pub fn morning_shift() -> EventRecord {
    serde_json::from_value(serde_json::json!({
        "id": 1,
        "title": "Shift",
        "start": "2024-01-05T09:00",
        "end": "2024-01-05T17:00",
        "extendedProps": { "description": "Morning shift" }
    }))
    .unwrap()
}
