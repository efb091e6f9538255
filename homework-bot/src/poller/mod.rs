//! The poll → validate → interpret → notify loop.

mod service;
mod state;

pub use service::{PollerConfig, StatusPoller, failure_message};
pub use state::{CycleOutcome, ExitReason, NotificationState, PollState};
