//! Poll loop states and outcomes.

use crate::error::{FetchError, InterpretationError, ValidationError};

/// Where the poll loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PollState {
    Idle,
    Fetching,
    Validating,
    Interpreting,
    Notifying,
    Sleeping,
    /// Terminal.
    Aborted,
}

/// The last status message sent (or attempted), if any.
///
/// A message is delivered only when it differs from the stored one. The
/// stored value is replaced after every attempt, successful or not, so a
/// broken channel never causes the same text to be re-sent forever.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    last: Option<String>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    pub fn is_unchanged(&self, message: &str) -> bool {
        self.last.as_deref() == Some(message)
    }

    pub fn record(&mut self, message: String) {
        self.last = Some(message);
    }
}

/// What a single cycle decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new message was handed to the notifier.
    Notified { delivered: bool },
    /// The interpreted message equals the last one; nothing sent.
    Unchanged,
    /// Retryable fetch failure; cursor kept.
    FetchFailed(FetchError),
    /// Payload had the wrong shape; cursor kept.
    ValidationFailed(ValidationError),
    /// Latest record could not be interpreted; cursor advanced.
    InterpretationFailed(InterpretationError),
    /// A panic escaped the cycle.
    Unexpected(String),
    /// Credentials rejected. The loop stops.
    Aborted(FetchError),
}

/// Why [`super::StatusPoller::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// Cancelled from outside (signal). Exit status 0.
    Shutdown,
    /// Fatal error. Exit status non-zero.
    Aborted(String),
}

impl ExitReason {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Shutdown)
    }
}
