//! Data source handed to the rendering library.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::CalendarError;
use crate::fetcher::EventLoader;
use crate::types::{DateRange, EventRecord};

/// The rendering library's consumer for one range request.
///
/// Exactly one of the two methods is called, or neither when the request
/// belongs to a calendar instance that has since been destroyed.
pub trait EventSink: Send {
    fn success(self: Box<Self>, events: Vec<EventRecord>);

    fn failure(self: Box<Self>, error: CalendarError);
}

/// Shared marker of which instance generation is currently alive. `0` means
/// no instance.
pub(crate) type LiveGeneration = Arc<AtomicU64>;

pub(crate) fn is_live(live: &LiveGeneration, generation: u64) -> bool {
    live.load(Ordering::SeqCst) == generation
}

/// Event data callback bound to one calendar instance.
#[derive(Clone)]
pub struct EventSource {
    loader: Arc<dyn EventLoader>,
    endpoint: String,
    generation: u64,
    live: LiveGeneration,
    runtime: Handle,
}

impl fmt::Debug for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("endpoint", &self.endpoint)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl EventSource {
    pub(crate) fn new(
        loader: Arc<dyn EventLoader>,
        endpoint: String,
        generation: u64,
        live: LiveGeneration,
        runtime: Handle,
    ) -> Self {
        Self {
            loader,
            endpoint,
            generation,
            live,
            runtime,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the owning instance has been destroyed or replaced.
    pub fn is_stale(&self) -> bool {
        !is_live(&self.live, self.generation)
    }

    /// Load `range` in the background and report to `sink`.
    ///
    /// Overlapping requests for different ranges are independent.
    pub fn request(&self, range: DateRange, sink: Box<dyn EventSink>) -> JoinHandle<()> {
        let source = self.clone();

        self.runtime.spawn(async move {
            if source.is_stale() {
                tracing::debug!(generation = source.generation, %range, "Skipping request for a destroyed calendar");
                return;
            }

            let result = source.loader.load(&source.endpoint, range).await;

            if source.is_stale() {
                tracing::debug!(
                    generation = source.generation,
                    %range,
                    "Discarding events for a destroyed calendar"
                );
                return;
            }

            match result {
                Ok(events) => sink.success(events),
                Err(e) => {
                    tracing::warn!(
                        endpoint = %source.endpoint,
                        %range,
                        error = %e,
                        "Reporting event load failure to the calendar"
                    );
                    sink.failure(e);
                }
            }
        })
    }
}
