//! Page-side contract: containers, placeholders, the description panel,
//! form fields and lifecycle signals.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// A calendar container found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    /// Endpoint override carried by the container (`data-endpoint`)
    pub endpoint: Option<String>,
}

impl ContainerInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// The override when present and non-blank, otherwise `default`.
    pub fn endpoint_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(default)
    }
}

/// Signals the page emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    /// Initial page load finished
    PageLoaded,
    /// Content is about to be replaced by a partial swap
    BeforeSwap,
    /// Swapped-in content has settled
    AfterSettle,
    /// Viewport width changed
    Resized(u32),
    /// The user pressed the reload action of an error placeholder
    RetryRequested { container_id: String },
}

impl HostSignal {
    pub fn kind(&self) -> SignalKind {
        match self {
            HostSignal::PageLoaded => SignalKind::PageLoaded,
            HostSignal::BeforeSwap => SignalKind::BeforeSwap,
            HostSignal::AfterSettle => SignalKind::AfterSettle,
            HostSignal::Resized(_) => SignalKind::Resized,
            HostSignal::RetryRequested { .. } => SignalKind::RetryRequested,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    PageLoaded,
    BeforeSwap,
    AfterSettle,
    Resized,
    RetryRequested,
}

pub type SignalHandler = Arc<dyn Fn(&HostSignal) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Error placeholder shown in place of the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAffordance {
    pub message: String,
    /// Label of the manual reload action
    pub action_label: String,
}

impl ErrorAffordance {
    pub fn reload(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action_label: "Reload".to_string(),
        }
    }
}

/// The page the calendar lives in.
///
/// Lookups of optional elements return `false`/`None` when the element is
/// absent; nothing here is allowed to fail loudly.
pub trait Host: Send + Sync {
    fn container(&self, id: &str) -> Option<ContainerInfo>;

    fn viewport_width(&self) -> u32;

    fn show_loading(&self, container_id: &str);

    /// Replace the container content with an error placeholder. The
    /// placeholder's action emits [`HostSignal::RetryRequested`].
    fn show_error(&self, container_id: &str, affordance: &ErrorAffordance);

    /// Remove any loading or error placeholder.
    fn clear_placeholder(&self, container_id: &str);

    /// Show `text` in the description panel. `false` when the panel is absent.
    fn show_description(&self, text: &str) -> bool;

    fn hide_description(&self);

    /// Set a form input value by name. `false` when no such input exists.
    fn set_field_value(&self, name: &str, value: &str) -> bool;

    fn subscribe(&self, kind: SignalKind, handler: SignalHandler) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Subscription bookkeeping for [`Host`] implementations.
#[derive(Default)]
pub struct SignalRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    handlers: BTreeMap<SubscriptionId, (SignalKind, SignalHandler)>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: SignalKind, handler: SignalHandler) -> SubscriptionId {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.handlers.insert(id, (kind, handler));
        id
    }

    /// Returns whether `id` was subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.lock().handlers.remove(&id).is_some()
    }

    /// Deliver `signal` to every matching handler, in subscription order.
    ///
    /// Handlers run without the registry lock held, so they may subscribe or
    /// unsubscribe. Returns the number of handlers called.
    pub fn emit(&self, signal: &HostSignal) -> usize {
        let kind = signal.kind();
        let handlers: Vec<SignalHandler> = self
            .inner
            .lock()
            .handlers
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in &handlers {
            handler(signal);
        }
        handlers.len()
    }

    pub fn count(&self, kind: SignalKind) -> usize {
        self.inner
            .lock()
            .handlers
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}
