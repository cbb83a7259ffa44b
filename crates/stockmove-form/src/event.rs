//! Controller event recording for debugging and tests.
//!
//! Every transition of the form controller emits an event; sinks decide
//! whether to keep, log or drop them.

use chrono::{DateTime, Utc};

/// The controller transition that generated an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormEventKind {
    Boot,
    TypeChanged,
    ProductChanged,
    OriginChanged,
    DestinationChanged,
    QuantityChanged,
    RefreshIssued,
    RefreshApplied,
    RefreshDiscarded,
    SubmitBlocked,
    SubmitAllowed,
}

impl std::fmt::Display for FormEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Boot => "boot",
            Self::TypeChanged => "type_changed",
            Self::ProductChanged => "product_changed",
            Self::OriginChanged => "origin_changed",
            Self::DestinationChanged => "destination_changed",
            Self::QuantityChanged => "quantity_changed",
            Self::RefreshIssued => "refresh_issued",
            Self::RefreshApplied => "refresh_applied",
            Self::RefreshDiscarded => "refresh_discarded",
            Self::SubmitBlocked => "submit_blocked",
            Self::SubmitAllowed => "submit_allowed",
        };
        f.write_str(s)
    }
}

/// One recorded controller transition.
#[derive(Debug, Clone)]
pub struct FormEvent {
    pub timestamp: DateTime<Utc>,
    /// Refresh generation current when the event was recorded.
    pub generation: u64,
    pub kind: FormEventKind,
    pub detail: String,
}

impl FormEvent {
    pub fn new(generation: u64, kind: FormEventKind, detail: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            generation,
            kind,
            detail: detail.into(),
        }
    }
}

/// Receiver of controller events.
pub trait FormEventSink: Send + Sync {
    fn record(&self, event: FormEvent);
}

/// In-memory event sink for testing.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: std::sync::Mutex<Vec<FormEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FormEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn kinds(&self) -> Vec<FormEventKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }

    pub fn count(&self) -> usize {
        match self.events.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn count_of(&self, kind: FormEventKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }
}

impl FormEventSink for InMemoryEventSink {
    fn record(&self, event: FormEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Sink that forwards events to `tracing` at debug level.
pub struct TracingEventSink;

impl FormEventSink for TracingEventSink {
    fn record(&self, event: FormEvent) {
        tracing::debug!(
            kind = %event.kind,
            generation = event.generation,
            detail = %event.detail,
            "form event"
        );
    }
}
