//! Typed domain events carried by the [`EventBus`](crate::EventBus).
//!
//! Each channel has exactly one payload type. Subscribers register for a
//! payload type and receive it by reference, so field access is checked at
//! compile time instead of probing an untyped record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event_bus::Channel;

/// A patient as announced to other UI regions after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: String,
    pub department: String,
    pub attending_provider: String,
}

impl PatientRecord {
    /// "First Last", as shown in lists and shortcut descriptions.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A visit as announced to other UI regions after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub has_transcript: bool,
}

/// Processing state of a visit transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for TranscriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Payload of the `patient-created` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientCreated {
    pub patient: PatientRecord,
}

/// Payload of the `visit-created` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitCreated {
    pub visit: VisitRecord,
}

/// Payload of the `transcript-updated` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptUpdated {
    pub visit_id: String,
    pub status: TranscriptStatus,
    pub timestamp: DateTime<Utc>,
}

/// Any event that can travel on the bus, tagged by channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum BusEvent {
    PatientCreated(PatientCreated),
    VisitCreated(VisitCreated),
    TranscriptUpdated(TranscriptUpdated),
}

impl BusEvent {
    /// The channel this event is published on.
    pub fn channel(&self) -> Channel {
        match self {
            Self::PatientCreated(_) => Channel::PatientCreated,
            Self::VisitCreated(_) => Channel::VisitCreated,
            Self::TranscriptUpdated(_) => Channel::TranscriptUpdated,
        }
    }
}

/// A payload type bound to a single bus channel.
pub trait ChannelEvent: Clone + Send + Sync + 'static {
    /// The channel this payload travels on.
    const CHANNEL: Channel;

    /// Wrap the payload into the tagged event.
    fn into_event(self) -> BusEvent;

    /// Borrow the payload back out of a tagged event, if it is this type.
    fn from_event(event: &BusEvent) -> Option<&Self>;
}

macro_rules! impl_channel_event {
    ($ty:ident) => {
        impl ChannelEvent for $ty {
            const CHANNEL: Channel = Channel::$ty;

            fn into_event(self) -> BusEvent {
                BusEvent::$ty(self)
            }

            fn from_event(event: &BusEvent) -> Option<&Self> {
                match event {
                    BusEvent::$ty(payload) => Some(payload),
                    _ => None,
                }
            }
        }

        impl From<$ty> for BusEvent {
            fn from(payload: $ty) -> Self {
                payload.into_event()
            }
        }
    };
}

impl_channel_event!(PatientCreated);
impl_channel_event!(VisitCreated);
impl_channel_event!(TranscriptUpdated);

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> PatientRecord {
        PatientRecord {
            id: "P-001".into(),
            first_name: "Ada".into(),
            last_name: "Moreau".into(),
            age: 47,
            gender: "female".into(),
            department: "Cardiology".into(),
            attending_provider: "Dr. Okafor".into(),
        }
    }

    #[test]
    fn test_event_channel_mapping() {
        let event: BusEvent = PatientCreated { patient: patient() }.into();
        assert_eq!(event.channel(), Channel::PatientCreated);
        assert!(PatientCreated::from_event(&event).is_some());
        assert!(VisitCreated::from_event(&event).is_none());
    }

    #[test]
    fn test_full_name() {
        assert_eq!(patient().full_name(), "Ada Moreau");
    }

    #[test]
    fn test_transcript_status_display() {
        assert_eq!(TranscriptStatus::Completed.to_string(), "completed");
        assert_eq!(TranscriptStatus::Processing.to_string(), "processing");
    }
}
