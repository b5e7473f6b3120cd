//! Core services for Clinic Shell.
//!
//! This crate provides the process-local plumbing shared by every UI region
//! of the clinical documentation shell:
//!
//! - **Event Bus**: Typed, named-channel publish/subscribe for domain events
//! - **Domain Events**: Patient created, visit created, transcript updated
//! - **Diagnostics**: Injected sinks receiving caught callback failures
//! - **Logging**: `tracing` targets and helper macros
//!
//! # Event Bus Example
//!
//! ```
//! use clinic_shell_core::{EventBus, PatientCreated};
//!
//! let bus = EventBus::default();
//!
//! // A patient list elsewhere in the tree refreshes on creation.
//! let id = bus.subscribe(|event: &PatientCreated| {
//!     println!("new patient: {}", event.patient.full_name());
//!     Ok(())
//! });
//!
//! // Teardown releases the subscription.
//! bus.unsubscribe(id);
//! ```

pub mod diagnostics;
mod error;
pub mod event_bus;
pub mod events;
pub mod logging;

pub use diagnostics::{DiagnosticSink, FanoutSink, MemorySink, RecordedFailure, TracingSink};
pub use error::{invoke_guarded, FailureSite, HandlerError, HandlerResult, InvocationFailure};
pub use event_bus::{
    BusStats, Channel, EventBus, PublishReport, Subscription, SubscriptionId, UnknownChannel,
};
pub use events::{
    BusEvent, ChannelEvent, PatientCreated, PatientRecord, TranscriptStatus, TranscriptUpdated,
    VisitCreated, VisitRecord,
};
