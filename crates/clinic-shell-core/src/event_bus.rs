//! Named-channel publish/subscribe for domain events.
//!
//! The [`EventBus`] decouples producers of domain lifecycle events (a patient
//! form, a visit scheduler, the transcript pipeline) from consumers mounted
//! elsewhere in the UI tree that share no ancestor state.
//!
//! # Key Types
//!
//! - [`EventBus`] - Cloneable handle to one bus instance
//! - [`Channel`] - The three named topics
//! - [`SubscriptionId`] - Returned by [`EventBus::subscribe`], used to unsubscribe
//! - [`Subscription`] - RAII guard that unsubscribes when dropped
//!
//! # Delivery
//!
//! Delivery is synchronous. For one publish, subscribers run in the order
//! they subscribed, against the subscriber list as it was when the publish
//! started: callbacks that subscribe or unsubscribe during delivery affect
//! only later publishes. A failing subscriber (an `Err` return or a panic)
//! is reported to the bus's [`DiagnosticSink`] and delivery continues.
//!
//! # Example
//!
//! ```
//! use clinic_shell_core::{EventBus, TranscriptStatus, TranscriptUpdated};
//!
//! let bus = EventBus::default();
//! let id = bus.subscribe(|update: &TranscriptUpdated| {
//!     println!("visit {} is now {}", update.visit_id, update.status);
//!     Ok(())
//! });
//!
//! let report = bus.publish(TranscriptUpdated {
//!     visit_id: "V-100".into(),
//!     status: TranscriptStatus::Completed,
//!     timestamp: chrono::Utc::now(),
//! });
//! assert_eq!(report.delivered, 1);
//!
//! assert!(bus.unsubscribe(id));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{invoke_guarded, FailureSite, HandlerResult, InvocationFailure};
use crate::events::{BusEvent, ChannelEvent};

new_key_type! {
    /// A unique identifier for one subscription.
    ///
    /// Ids carry a generation, so an id whose subscription has already been
    /// removed can never remove a newer subscription that reused its slot.
    pub struct SubscriptionId;
}

/// A named topic on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    /// "patient-created"
    PatientCreated,
    /// "visit-created"
    VisitCreated,
    /// "transcript-updated"
    TranscriptUpdated,
}

impl Channel {
    /// Every channel, in declaration order.
    pub const ALL: [Channel; 3] = [
        Channel::PatientCreated,
        Channel::VisitCreated,
        Channel::TranscriptUpdated,
    ];

    /// The channel's wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PatientCreated => "patient-created",
            Self::VisitCreated => "visit-created",
            Self::TranscriptUpdated => "transcript-updated",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::PatientCreated => 0,
            Self::VisitCreated => 1,
            Self::TranscriptUpdated => 2,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown channel name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel '{0}'")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

type Callback = Arc<dyn Fn(&BusEvent) -> HandlerResult + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    callback: Callback,
}

struct BusState {
    /// Live subscription ids and the channel each one belongs to.
    ids: SlotMap<SubscriptionId, Channel>,
    /// Subscribers per channel, in subscription order.
    channels: [Vec<Subscriber>; 3],
}

impl BusState {
    fn new() -> Self {
        Self {
            ids: SlotMap::with_key(),
            channels: [Vec::new(), Vec::new(), Vec::new()],
        }
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let Some(channel) = self.ids.remove(id) else {
            return false;
        };
        self.channels[channel.index()].retain(|s| s.id != id);
        true
    }
}

struct BusInner {
    state: Mutex<BusState>,
    sink: Arc<dyn DiagnosticSink>,
}

/// Outcome of a single publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscribers that ran to completion.
    pub delivered: usize,
    /// Subscribers that returned an error or panicked.
    pub failed: usize,
}

impl PublishReport {
    /// Total subscribers invoked.
    pub fn invoked(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Subscriber counts per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusStats {
    pub patient_created: usize,
    pub visit_created: usize,
    pub transcript_updated: usize,
}

impl BusStats {
    /// Sum over all channels.
    pub fn total(&self) -> usize {
        self.patient_created + self.visit_created + self.transcript_updated
    }
}

/// A process-wide publish/subscribe service, passed around by handle.
///
/// Cloning an `EventBus` yields another handle to the same bus. The
/// application shell constructs one bus and hands clones to every UI region
/// that publishes or subscribes.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl EventBus {
    /// Create a bus reporting subscriber failures to `sink`.
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                state: Mutex::new(BusState::new()),
                sink,
            }),
        }
    }

    /// Subscribe to the channel carrying payload type `E`.
    ///
    /// Returns an id to pass to [`unsubscribe`](Self::unsubscribe) when the
    /// subscribing region is torn down.
    pub fn subscribe<E, F>(&self, callback: F) -> SubscriptionId
    where
        E: ChannelEvent,
        F: Fn(&E) -> HandlerResult + Send + Sync + 'static,
    {
        self.insert(
            E::CHANNEL,
            Arc::new(move |event: &BusEvent| match E::from_event(event) {
                Some(payload) => callback(payload),
                None => Ok(()),
            }),
        )
    }

    /// Subscribe to a channel with an untyped callback receiving the tagged event.
    pub fn subscribe_channel<F>(&self, channel: Channel, callback: F) -> SubscriptionId
    where
        F: Fn(&BusEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.insert(channel, Arc::new(callback))
    }

    /// Subscribe with automatic unsubscription when the guard is dropped.
    pub fn subscribe_scoped<E, F>(&self, callback: F) -> Subscription
    where
        E: ChannelEvent,
        F: Fn(&E) -> HandlerResult + Send + Sync + 'static,
    {
        let id = self.subscribe(callback);
        Subscription {
            bus: Arc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    fn insert(&self, channel: Channel, callback: Callback) -> SubscriptionId {
        let mut state = self.inner.state.lock();
        let id = state.ids.insert(channel);
        state.channels[channel.index()].push(Subscriber { id, callback });
        crate::shell_debug!(
            channel = %channel,
            total = state.channels[channel.index()].len(),
            "subscriber registered"
        );
        id
    }

    /// Remove one subscription.
    ///
    /// Returns `true` if it was found and removed, `false` for ids that are
    /// unknown or already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.state.lock().remove(id)
    }

    /// Remove every subscriber on `channel`. Returns how many were removed.
    pub fn clear(&self, channel: Channel) -> usize {
        let mut state = self.inner.state.lock();
        let removed = std::mem::take(&mut state.channels[channel.index()]);
        for subscriber in &removed {
            state.ids.remove(subscriber.id);
        }
        crate::shell_debug!(channel = %channel, removed = removed.len(), "channel cleared");
        removed.len()
    }

    /// Remove every subscriber on every channel.
    pub fn clear_all(&self) {
        for channel in Channel::ALL {
            self.clear(channel);
        }
    }

    /// Number of subscribers on `channel`.
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.inner.state.lock().channels[channel.index()].len()
    }

    /// Subscriber counts for all channels.
    pub fn stats(&self) -> BusStats {
        let state = self.inner.state.lock();
        BusStats {
            patient_created: state.channels[Channel::PatientCreated.index()].len(),
            visit_created: state.channels[Channel::VisitCreated.index()].len(),
            transcript_updated: state.channels[Channel::TranscriptUpdated.index()].len(),
        }
    }

    /// Publish a typed payload on its channel.
    pub fn publish<E: ChannelEvent>(&self, payload: E) -> PublishReport {
        self.publish_event(payload.into_event())
    }

    /// Publish a tagged event on the channel it names.
    ///
    /// Every subscriber present when the call starts is invoked once, in
    /// subscription order. Failures are reported to the diagnostic sink and
    /// never reach the publisher.
    #[tracing::instrument(
        name = "clinic_shell::publish",
        skip_all,
        target = "clinic_shell_core::event_bus",
        level = "trace",
        fields(channel = %event.channel())
    )]
    pub fn publish_event(&self, event: BusEvent) -> PublishReport {
        let channel = event.channel();

        // Snapshot, then release the lock so callbacks may re-enter the bus.
        let callbacks: Vec<Callback> = {
            let state = self.inner.state.lock();
            state.channels[channel.index()]
                .iter()
                .map(|s| s.callback.clone())
                .collect()
        };

        if callbacks.is_empty() {
            crate::shell_trace!(channel = %channel, "publish with no subscribers");
            return PublishReport::default();
        }

        let mut report = PublishReport::default();
        for (position, callback) in callbacks.iter().enumerate() {
            match invoke_guarded(|| callback(&event)) {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    report.failed += 1;
                    self.inner.sink.record(InvocationFailure::new(
                        FailureSite::Subscriber { channel, position },
                        error,
                    ));
                }
            }
        }

        if report.failed > 0 {
            crate::shell_warn!(
                channel = %channel,
                delivered = report.delivered,
                failed = report.failed,
                "publish completed with failing subscribers"
            );
        } else {
            tracing::trace!(
                target: "clinic_shell_core::event_bus",
                delivered = report.delivered,
                "publish complete"
            );
        }
        report
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("stats", &self.stats())
            .finish()
    }
}

static_assertions::assert_impl_all!(EventBus: Send, Sync, Clone);

/// A subscription that is removed when the guard is dropped.
///
/// The guard holds only a weak reference to the bus, so it never keeps a
/// bus alive and dropping it after the bus is gone is harmless.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use clinic_shell_core::{Channel, EventBus, VisitCreated};
///
/// let bus = EventBus::default();
/// let seen = Arc::new(AtomicUsize::new(0));
/// {
///     let seen = seen.clone();
///     let _guard = bus.subscribe_scoped(move |_: &VisitCreated| {
///         seen.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     });
///     assert_eq!(bus.subscriber_count(Channel::VisitCreated), 1);
/// }
/// assert_eq!(bus.subscriber_count(Channel::VisitCreated), 0);
/// ```
#[must_use = "dropping the guard immediately unsubscribes"]
pub struct Subscription {
    bus: Weak<BusInner>,
    id: Option<SubscriptionId>,
}

impl Subscription {
    /// The underlying subscription id, unless detached.
    pub fn id(&self) -> Option<SubscriptionId> {
        self.id
    }

    /// Keep the subscription alive past the guard; returns its id.
    pub fn detach(mut self) -> Option<SubscriptionId> {
        self.id.take()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let (Some(id), Some(inner)) = (self.id.take(), self.bus.upgrade()) {
            inner.state.lock().remove(id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
