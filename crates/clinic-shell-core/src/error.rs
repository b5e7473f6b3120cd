//! Error types for Clinic Shell callbacks.
//!
//! Shortcut actions and event-bus subscribers are fallible callbacks. Their
//! failures never propagate to whoever triggered them; instead they are
//! wrapped in an [`InvocationFailure`] and handed to a
//! [`DiagnosticSink`](crate::diagnostics::DiagnosticSink).

use std::any::Any;
use std::fmt;

use crate::event_bus::Channel;

/// Result type returned by shortcut actions and bus subscribers.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Error raised by a shortcut action or a bus subscriber.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A plain failure message.
    #[error("{0}")]
    Message(String),

    /// The callback panicked; the payload was recovered as text.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// Any other error type bubbled up from the callback.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Create a message error.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap an arbitrary error.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(err))
    }

    /// Convert a panic payload captured by `catch_unwind`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let text = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(text)
    }

    /// Returns `true` if this error came from a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

/// Where a failed invocation happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureSite {
    /// A shortcut action fired by the dispatcher.
    Action {
        /// The rendered key chord of the binding.
        chord: String,
        /// The binding's human-readable description.
        description: String,
    },
    /// A subscriber invoked during a publish.
    Subscriber {
        /// The channel being published on.
        channel: Channel,
        /// Zero-based position of the subscriber in delivery order.
        position: usize,
    },
}

impl fmt::Display for FailureSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action { chord, description } => {
                write!(f, "shortcut '{chord}' ({description})")
            }
            Self::Subscriber { channel, position } => {
                write!(f, "subscriber #{} on '{}'", position + 1, channel)
            }
        }
    }
}

/// A caught callback failure, as reported to a diagnostic sink.
#[derive(Debug)]
pub struct InvocationFailure {
    /// Where the failure happened.
    pub site: FailureSite,
    /// What went wrong.
    pub error: HandlerError,
}

impl InvocationFailure {
    /// Create a new failure record.
    pub fn new(site: FailureSite, error: HandlerError) -> Self {
        Self { site, error }
    }
}

impl fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.site, self.error)
    }
}

impl std::error::Error for InvocationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Run a callback, converting both `Err` returns and panics into a
/// [`HandlerError`].
pub fn invoke_guarded<F>(callback: F) -> HandlerResult
where
    F: FnOnce() -> HandlerResult,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(callback)) {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::from_panic(payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_guarded_ok() {
        assert!(invoke_guarded(|| Ok(())).is_ok());
    }

    #[test]
    fn test_invoke_guarded_err() {
        let err = invoke_guarded(|| Err(HandlerError::msg("boom"))).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(!err.is_panic());
    }

    #[test]
    fn test_invoke_guarded_panic() {
        let err = invoke_guarded(|| panic!("kaput")).unwrap_err();
        assert!(err.is_panic());
        assert_eq!(err.to_string(), "handler panicked: kaput");
    }

    #[test]
    fn test_invoke_guarded_formatted_panic() {
        let n = 3;
        let err = invoke_guarded(|| panic!("bad index {n}")).unwrap_err();
        assert_eq!(err.to_string(), "handler panicked: bad index 3");
    }

    #[test]
    fn test_other_error_is_transparent() {
        let io = std::io::Error::other("disk gone");
        let err = HandlerError::other(io);
        assert_eq!(err.to_string(), "disk gone");
    }

    #[test]
    fn test_failure_display() {
        let failure = InvocationFailure::new(
            FailureSite::Subscriber {
                channel: Channel::VisitCreated,
                position: 1,
            },
            HandlerError::msg("nope"),
        );
        assert_eq!(
            failure.to_string(),
            "subscriber #2 on 'visit-created' failed: nope"
        );

        let failure = InvocationFailure::new(
            FailureSite::Action {
                chord: "⇧ + D".into(),
                description: "Go to Dashboard".into(),
            },
            HandlerError::msg("no route"),
        );
        assert_eq!(
            failure.to_string(),
            "shortcut '⇧ + D' (Go to Dashboard) failed: no route"
        );
    }
}
