//! Calendar view controller.
//!
//! Owns the single calendar instance and moves it through
//! `Uninitialized → Active | Failed` in response to page lifecycle signals,
//! viewport changes and explicit calls. Every transition runs to completion
//! under the state lock, so nothing observes a half-destroyed instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use calview_core::Config;
use chrono::Local;
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::backend::{CalendarBackend, CalendarOptions, CalendarWidget, DisplayOptions};
use crate::error::CalendarError;
use crate::fetcher::EventLoader;
use crate::form::prefill_schedule_fields;
use crate::host::{ErrorAffordance, Host, HostSignal, SignalHandler, SignalKind, SubscriptionId};
use crate::panel::{DescriptionPanel, EventClickHandler};
use crate::responsive::{compute_viewport_config_with, Breakpoints, DeviceClass};
use crate::schedule::Debouncer;
use crate::source::{EventSource, LiveGeneration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Active,
    Failed,
}

/// Tunables of the controller.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Endpoint used when the container carries no override
    pub endpoint: String,
    pub resize_debounce: Duration,
    pub description_hide_after: Duration,
    pub breakpoints: Breakpoints,
    pub display: DisplayOptions,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            endpoint: "/api/events/data".to_string(),
            resize_debounce: Duration::from_millis(250),
            description_hide_after: Duration::from_millis(5000),
            breakpoints: Breakpoints::default(),
            display: DisplayOptions::default(),
        }
    }
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.calendar.endpoint.clone(),
            resize_debounce: Duration::from_millis(config.calendar.resize_debounce_ms),
            description_hide_after: Duration::from_millis(config.calendar.description_hide_ms),
            breakpoints: Breakpoints::from(config.viewport),
            display: DisplayOptions::default(),
        }
    }
}

struct LiveInstance {
    widget: Box<dyn CalendarWidget>,
    container_id: String,
    generation: u64,
}

struct ControllerState {
    lifecycle: LifecycleState,
    instance: Option<LiveInstance>,
    failure: Option<String>,
    next_generation: u64,
    last_device: Option<DeviceClass>,
    resize_evaluations: u64,
    /// Torn down with the instance
    instance_subscriptions: Vec<SubscriptionId>,
    /// Registered once, survive instance recreation
    lifecycle_subscriptions: Vec<SubscriptionId>,
}

struct Shared {
    host: Arc<dyn Host>,
    backend: Arc<dyn CalendarBackend>,
    loader: Arc<dyn EventLoader>,
    settings: ControllerSettings,
    runtime: Handle,
    live: LiveGeneration,
    panel: Arc<DescriptionPanel>,
    resize: Debouncer,
    state: Mutex<ControllerState>,
}

/// Owner of the calendar instance. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CalendarController {
    shared: Arc<Shared>,
}

impl CalendarController {
    /// Build a controller on the current tokio runtime.
    ///
    /// # Errors
    /// [`CalendarError::NoRuntime`] outside a tokio runtime.
    pub fn new(
        host: Arc<dyn Host>,
        backend: Arc<dyn CalendarBackend>,
        loader: Arc<dyn EventLoader>,
        settings: ControllerSettings,
    ) -> Result<Self, CalendarError> {
        let runtime = Handle::try_current().map_err(|_| CalendarError::NoRuntime)?;
        Ok(Self::with_runtime(runtime, host, backend, loader, settings))
    }

    pub fn with_runtime(
        runtime: Handle,
        host: Arc<dyn Host>,
        backend: Arc<dyn CalendarBackend>,
        loader: Arc<dyn EventLoader>,
        settings: ControllerSettings,
    ) -> Self {
        let panel = Arc::new(DescriptionPanel::new(
            host.clone(),
            runtime.clone(),
            settings.description_hide_after,
        ));
        let resize = Debouncer::new(runtime.clone(), settings.resize_debounce);

        let shared = Shared {
            host,
            backend,
            loader,
            settings,
            runtime,
            live: Arc::new(AtomicU64::new(0)),
            panel,
            resize,
            state: Mutex::new(ControllerState {
                lifecycle: LifecycleState::Uninitialized,
                instance: None,
                failure: None,
                next_generation: 0,
                last_device: None,
                resize_evaluations: 0,
                instance_subscriptions: Vec::new(),
                lifecycle_subscriptions: Vec::new(),
            }),
        };

        Self {
            shared: Arc::new(shared),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.state.lock().lifecycle
    }

    /// Container of the live instance, if any.
    pub fn active_container(&self) -> Option<String> {
        self.shared
            .state
            .lock()
            .instance
            .as_ref()
            .map(|instance| instance.container_id.clone())
    }

    /// Generation of the live instance, if any.
    pub fn current_generation(&self) -> Option<u64> {
        self.shared
            .state
            .lock()
            .instance
            .as_ref()
            .map(|instance| instance.generation)
    }

    /// User-facing message of the last failed initialization, while failed.
    pub fn failure_message(&self) -> Option<String> {
        self.shared.state.lock().failure.clone()
    }

    /// Number of debounced resize evaluations performed so far.
    pub fn resize_evaluations(&self) -> u64 {
        self.shared.state.lock().resize_evaluations
    }

    pub fn is_lifecycle_bound(&self) -> bool {
        !self.shared.state.lock().lifecycle_subscriptions.is_empty()
    }

    /// Create the calendar in `container_id`, destroying any live instance
    /// first.
    pub fn initialize(&self, container_id: &str) -> LifecycleState {
        let shared = &self.shared;
        let mut state = shared.state.lock();

        shared.teardown_locked(&mut state);

        let Some(container) = shared.host.container(container_id) else {
            tracing::warn!(container_id, "Calendar container not found, skipping");
            return state.lifecycle;
        };

        if !shared.backend.is_loaded() {
            shared.fail_locked(&mut state, container_id, CalendarError::LibraryMissing);
            return state.lifecycle;
        }

        shared.host.show_loading(container_id);

        let width = shared.host.viewport_width();
        let viewport = compute_viewport_config_with(width, &shared.settings.breakpoints);

        state.next_generation += 1;
        let generation = state.next_generation;
        let endpoint = container.endpoint_or(&shared.settings.endpoint).to_string();

        let source = EventSource::new(
            shared.loader.clone(),
            endpoint.clone(),
            generation,
            shared.live.clone(),
            shared.runtime.clone(),
        );
        let on_click = EventClickHandler::new(shared.panel.clone(), generation, shared.live.clone());
        let options = CalendarOptions::new(&viewport, shared.settings.display.clone(), source, on_click);

        // The library may request its first range while rendering.
        shared.live.store(generation, Ordering::SeqCst);

        let mut widget = match shared.backend.create(&container, options) {
            Ok(widget) => widget,
            Err(e) => {
                shared.fail_locked(&mut state, container_id, e);
                return state.lifecycle;
            }
        };

        if let Err(e) = widget.render() {
            widget.destroy();
            shared.fail_locked(&mut state, container_id, e);
            return state.lifecycle;
        }

        shared.host.clear_placeholder(container_id);

        state.instance = Some(LiveInstance {
            widget,
            container_id: container_id.to_string(),
            generation,
        });
        state.lifecycle = LifecycleState::Active;
        state.failure = None;
        state.last_device = Some(viewport.device);

        tracing::info!(
            container_id,
            generation,
            width,
            view = %viewport.initial_view,
            endpoint = %endpoint,
            "Calendar initialized"
        );

        let filled = prefill_schedule_fields(shared.host.as_ref(), Local::now().naive_local());
        tracing::debug!(filled, "Prefilled schedule form fields");

        state.lifecycle
    }

    /// Destroy the live instance ahead of a content swap. Returns whether an
    /// instance was destroyed; calling it with nothing live is a no-op.
    pub fn teardown(&self) -> bool {
        let mut state = self.shared.state.lock();
        self.shared.teardown_locked(&mut state)
    }

    /// Record a viewport change; evaluated once the resize quiet period ends.
    pub fn on_resize(&self, width: u32) {
        let weak = Arc::downgrade(&self.shared);
        self.shared.resize.schedule(move || {
            if let Some(shared) = weak.upgrade() {
                shared.apply_viewport(width);
            }
        });
    }

    /// Hide the description panel now.
    pub fn dismiss_description(&self) {
        self.shared.panel.dismiss();
    }

    pub fn is_description_showing(&self) -> bool {
        self.shared.panel.is_showing()
    }

    /// Wire the controller to the page lifecycle: page load and settled
    /// swaps initialize `container_id`, pending swaps tear down, resizes are
    /// debounced. Registered once; later calls return `false`.
    pub fn bind_lifecycle(&self, container_id: &str) -> bool {
        let mut state = self.shared.state.lock();
        if !state.lifecycle_subscriptions.is_empty() {
            tracing::debug!("Lifecycle already bound");
            return false;
        }

        let host = &self.shared.host;
        let weak = Arc::downgrade(&self.shared);

        let init_id = container_id.to_string();
        let initialize = handler(weak.clone(), move |controller, _| {
            controller.initialize(&init_id);
        });

        state.lifecycle_subscriptions = vec![
            host.subscribe(SignalKind::PageLoaded, initialize.clone()),
            host.subscribe(SignalKind::AfterSettle, initialize),
            host.subscribe(
                SignalKind::BeforeSwap,
                handler(weak.clone(), |controller, _| {
                    controller.teardown();
                }),
            ),
            host.subscribe(
                SignalKind::Resized,
                handler(weak, |controller, signal| {
                    if let HostSignal::Resized(width) = signal {
                        controller.on_resize(*width);
                    }
                }),
            ),
        ];

        tracing::debug!(container_id, "Lifecycle signals bound");
        true
    }

    /// Remove the lifecycle subscriptions and destroy the live instance.
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        for id in state.lifecycle_subscriptions.drain(..) {
            self.shared.host.unsubscribe(id);
        }
        self.shared.resize.cancel();
        self.shared.teardown_locked(&mut state);
        tracing::info!("Calendar controller shut down");
    }
}

fn handler<F>(weak: Weak<Shared>, f: F) -> SignalHandler
where
    F: Fn(&CalendarController, &HostSignal) + Send + Sync + 'static,
{
    Arc::new(move |signal: &HostSignal| {
        if let Some(shared) = weak.upgrade() {
            f(&CalendarController { shared }, signal);
        }
    })
}

impl Shared {
    fn teardown_locked(&self, state: &mut ControllerState) -> bool {
        for id in state.instance_subscriptions.drain(..) {
            self.host.unsubscribe(id);
        }

        self.live.store(0, Ordering::SeqCst);
        state.lifecycle = LifecycleState::Uninitialized;
        state.failure = None;

        match state.instance.take() {
            Some(mut instance) => {
                instance.widget.destroy();
                self.panel.reset();
                tracing::info!(
                    container_id = %instance.container_id,
                    generation = instance.generation,
                    "Calendar destroyed"
                );
                true
            }
            None => false,
        }
    }

    fn fail_locked(
        self: &Arc<Self>,
        state: &mut ControllerState,
        container_id: &str,
        error: CalendarError,
    ) {
        self.live.store(0, Ordering::SeqCst);

        let message = error.user_message();
        tracing::error!(
            container_id,
            error = %error,
            fatal = error.is_fatal_for_instance(),
            "Calendar initialization failed"
        );

        self.host
            .show_error(container_id, &ErrorAffordance::reload(message.clone()));

        let weak = Arc::downgrade(self);
        let retry_id = container_id.to_string();
        let id = self.host.subscribe(
            SignalKind::RetryRequested,
            handler(weak, move |controller, signal| {
                if let HostSignal::RetryRequested { container_id } = signal {
                    if *container_id == retry_id {
                        controller.initialize(container_id);
                    }
                }
            }),
        );
        state.instance_subscriptions.push(id);

        state.instance = None;
        state.lifecycle = LifecycleState::Failed;
        state.failure = Some(message);
    }

    fn apply_viewport(&self, width: u32) {
        let viewport = compute_viewport_config_with(width, &self.settings.breakpoints);
        let mut state = self.state.lock();

        let crossed = state
            .last_device
            .is_some_and(|previous| previous.is_mobile() != viewport.device.is_mobile());
        state.last_device = Some(viewport.device);
        state.resize_evaluations += 1;

        let Some(instance) = state.instance.as_mut() else {
            tracing::debug!(width, "Resize with no live calendar");
            return;
        };

        if crossed && instance.widget.view_type() != viewport.initial_view {
            tracing::info!(width, view = %viewport.initial_view, "Switching calendar view");
            instance.widget.change_view(viewport.initial_view);
        }
        instance.widget.update_size();
    }
}
