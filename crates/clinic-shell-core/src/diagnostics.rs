//! Diagnostic sinks for caught callback failures.
//!
//! The dispatcher and the event bus never let a failing callback escape.
//! Every caught failure is handed to an injected [`DiagnosticSink`], which
//! decides where it goes: the `tracing` pipeline, an in-memory buffer a
//! developer panel can read, or both.
//!
//! ```
//! use std::sync::Arc;
//! use clinic_shell_core::diagnostics::{DiagnosticSink, FanoutSink, MemorySink, TracingSink};
//!
//! let memory = Arc::new(MemorySink::with_capacity(32));
//! let sinks: Vec<Arc<dyn DiagnosticSink>> = vec![Arc::new(TracingSink), memory.clone()];
//! let sink: Arc<dyn DiagnosticSink> = Arc::new(FanoutSink::new(sinks));
//! assert!(memory.is_empty());
//! # let _ = sink;
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::{FailureSite, HandlerError, InvocationFailure};

/// Receives callback failures caught by the dispatcher or the event bus.
pub trait DiagnosticSink: Send + Sync {
    /// Record a failure. Must not panic.
    fn record(&self, failure: InvocationFailure);
}

/// Sink that reports failures through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, failure: InvocationFailure) {
        match &failure.site {
            FailureSite::Action { chord, description } => {
                tracing::error!(
                    target: "clinic_shell_core::diagnostics",
                    chord = %chord,
                    description = %description,
                    panicked = failure.error.is_panic(),
                    error = %failure.error,
                    "error executing keyboard shortcut"
                );
            }
            FailureSite::Subscriber { channel, position } => {
                tracing::error!(
                    target: "clinic_shell_core::diagnostics",
                    channel = %channel,
                    position = *position,
                    panicked = failure.error.is_panic(),
                    error = %failure.error,
                    "error in event subscriber"
                );
            }
        }
    }
}

/// A failure kept by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFailure {
    /// Where the failure happened.
    pub site: FailureSite,
    /// Rendered error message.
    pub message: String,
    /// Whether the callback panicked rather than returning an error.
    pub panicked: bool,
    /// When the failure was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Default number of failures retained by [`MemorySink`].
pub const DEFAULT_MEMORY_CAPACITY: usize = 256;

/// Bounded in-memory sink; the oldest entries are dropped when full.
#[derive(Debug)]
pub struct MemorySink {
    entries: Mutex<VecDeque<RecordedFailure>>,
    capacity: usize,
}

impl MemorySink {
    /// Create a sink with [`DEFAULT_MEMORY_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    /// Create a sink that keeps at most `capacity` failures (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    /// Maximum number of retained failures.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained failures.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no failure has been retained.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of the retained failures, oldest first.
    pub fn entries(&self) -> Vec<RecordedFailure> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Remove and return all retained failures.
    pub fn drain(&self) -> Vec<RecordedFailure> {
        self.entries.lock().drain(..).collect()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, failure: InvocationFailure) {
        let entry = RecordedFailure {
            panicked: failure.error.is_panic(),
            message: failure.error.to_string(),
            site: failure.site,
            recorded_at: Utc::now(),
        };
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
            crate::shell_trace!(capacity = self.capacity, "memory sink full, dropped oldest failure");
        }
        entries.push_back(entry);
    }
}

/// Forwards each failure to several sinks.
///
/// [`InvocationFailure`] is not `Clone` (it owns the error), so every sink
/// after the first receives a copy with the error rendered as a message.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl FanoutSink {
    /// Create a fan-out over the given sinks, in order.
    pub fn new(sinks: Vec<Arc<dyn DiagnosticSink>>) -> Self {
        Self { sinks }
    }

    /// Number of wrapped sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sink is wrapped.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DiagnosticSink for FanoutSink {
    fn record(&self, failure: InvocationFailure) {
        let Some((first, rest)) = self.sinks.split_first() else {
            return;
        };
        for sink in rest {
            let error = match &failure.error {
                HandlerError::Panicked(text) => HandlerError::Panicked(text.clone()),
                other => HandlerError::Message(other.to_string()),
            };
            sink.record(InvocationFailure::new(failure.site.clone(), error));
        }
        first.record(failure);
    }
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
