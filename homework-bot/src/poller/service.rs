//! Status poller implementation.
//!
//! The StatusPoller owns the cursor and the last-sent message and runs one
//! cycle at a time:
//! - fetch everything since the cursor
//! - validate the payload shape
//! - interpret the most recent homework
//! - notify if the resulting message differs from the last one
//!
//! then sleeps for a fixed interval. Only rejected credentials stop the loop;
//! every other failure is logged and the next cycle runs on schedule.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::state::{CycleOutcome, ExitReason, NotificationState, PollState};
use crate::client::StatusSource;
use crate::config::{BotConfig, DEFAULT_POLL_INTERVAL_SECS};
use crate::domain::Cursor;
use crate::error::ErrorClass;
use crate::interpreter::StatusInterpreter;
use crate::notifier::Notifier;
use crate::panic_hook::payload_message;
use crate::validator;

/// Text sent to the chat when the bot itself is failing.
pub fn failure_message(error: &dyn fmt::Display) -> String {
    format!("program failure: {}", error)
}

/// Configuration for the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Fixed sleep between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Report retryable and soft failures to the chat as well.
    pub notify_on_errors: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            notify_on_errors: false,
        }
    }
}

impl From<&BotConfig> for PollerConfig {
    fn from(config: &BotConfig) -> Self {
        Self {
            interval: config.poll_interval,
            notify_on_errors: config.notify_on_errors,
        }
    }
}

/// The status poller.
pub struct StatusPoller<S: StatusSource, N: Notifier> {
    source: Arc<S>,
    notifier: Arc<N>,
    interpreter: StatusInterpreter,
    config: PollerConfig,
    /// Lower bound of the next fetch. Moves only after a validated snapshot.
    cursor: Cursor,
    notification: NotificationState,
    /// Last failure text sent to the chat; cleared by a successful cycle.
    last_failure: Option<String>,
    state: PollState,
    cancellation_token: CancellationToken,
}

impl<S: StatusSource, N: Notifier> StatusPoller<S, N> {
    pub fn new(
        source: Arc<S>,
        notifier: Arc<N>,
        config: PollerConfig,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            source,
            notifier,
            interpreter: StatusInterpreter::default(),
            config,
            cursor: Cursor::epoch(),
            notification: NotificationState::new(),
            last_failure: None,
            state: PollState::Idle,
            cancellation_token,
        }
    }

    /// Replace the status interpreter (e.g. to register extra codes).
    pub fn with_interpreter(mut self, interpreter: StatusInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn notification(&self) -> &NotificationState {
        &self.notification
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    fn transition(&mut self, next: PollState) {
        trace!(from = %self.state, to = %next, "Poller state transition");
        self.state = next;
    }

    fn advance(&mut self, next: Cursor) {
        if next != self.cursor {
            debug!(from = %self.cursor, to = %next, "Advancing cursor");
        }
        self.cursor = next;
    }

    /// Run a single poll cycle without sleeping.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.transition(PollState::Fetching);
        let raw = match self.source.fetch(&self.cursor).await {
            Ok(raw) => raw,
            Err(error) => {
                if error.class() == ErrorClass::Fatal {
                    error!(fatal = true, error = %error, "Status API rejected the credentials, stopping");
                    self.notify_failure(failure_message(&error), false).await;
                    self.transition(PollState::Aborted);
                    return CycleOutcome::Aborted(error);
                }
                self.settle_failure(error.class(), &error, None);
                self.report_failure(failure_message(&error)).await;
                return CycleOutcome::FetchFailed(error);
            }
        };

        self.transition(PollState::Validating);
        let snapshot = match validator::validate(&raw) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                self.settle_failure(error.class(), &error, None);
                self.report_failure(failure_message(&error)).await;
                return CycleOutcome::ValidationFailed(error);
            }
        };
        debug!(
            homework = %snapshot.latest().homework_name,
            older = snapshot.older().len(),
            "Validated homework window"
        );

        self.transition(PollState::Interpreting);
        let next_cursor = snapshot.next_cursor().clone();
        let message = match self.interpreter.interpret(snapshot.latest()) {
            Ok(message) => message,
            Err(error) => {
                self.settle_failure(error.class(), &error, Some(next_cursor));
                self.report_failure(failure_message(&error)).await;
                return CycleOutcome::InterpretationFailed(error);
            }
        };

        self.advance(next_cursor);
        self.last_failure = None;

        if self.notification.is_unchanged(&message) {
            debug!(homework = %snapshot.latest().homework_name, "Homework status unchanged");
            return CycleOutcome::Unchanged;
        }

        self.transition(PollState::Notifying);
        let delivered = self.deliver(&message).await;
        self.notification.record(message);

        CycleOutcome::Notified { delivered }
    }

    /// Log a non-fatal failure and settle the cursor by its class.
    ///
    /// Retryable failures keep the cursor so the same window is fetched again.
    /// Soft failures move past the window when a next cursor is known.
    fn settle_failure(
        &mut self,
        class: ErrorClass,
        error: &dyn fmt::Display,
        next_cursor: Option<Cursor>,
    ) {
        match (class, next_cursor) {
            (ErrorClass::Soft, Some(next)) => {
                warn!(class = %class, error = %error, "Cycle failed, skipping this window");
                self.advance(next);
            }
            _ => {
                warn!(class = %class, cursor = %self.cursor, error = %error, "Cycle failed, will retry");
            }
        }
    }

    /// Run cycles until cancelled or a fatal error occurs.
    pub async fn run(&mut self) -> ExitReason {
        let token = self.cancellation_token.clone();

        info!(
            interval = ?self.config.interval,
            channel = self.notifier.channel_type(),
            "Starting homework status poller"
        );

        loop {
            if token.is_cancelled() {
                info!("Poller received cancellation signal");
                return ExitReason::Shutdown;
            }

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                result = AssertUnwindSafe(self.run_cycle()).catch_unwind() => Some(result),
            };

            let Some(result) = result else {
                info!("Poller cancelled during a cycle");
                return ExitReason::Shutdown;
            };

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let reason = payload_message(payload.as_ref());
                    error!(panic = %reason, "Poll cycle failed unexpectedly, continuing");
                    let message = failure_message(&format!("unexpected error: {}", reason));
                    self.notify_failure(message, true).await;
                    CycleOutcome::Unexpected(reason)
                }
            };

            if let CycleOutcome::Aborted(error) = &outcome {
                return ExitReason::Aborted(error.to_string());
            }

            trace!(outcome = ?outcome, "Poll cycle finished");
            self.transition(PollState::Sleeping);

            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("Poller received cancellation signal");
                    return ExitReason::Shutdown;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }

    /// Deliver a status message. Failures are logged, never propagated.
    async fn deliver(&self, message: &str) -> bool {
        match self.notifier.deliver(message).await {
            Ok(()) => {
                info!(channel = self.notifier.channel_type(), "Homework status change notified");
                true
            }
            Err(error) => {
                error!(
                    channel = self.notifier.channel_type(),
                    class = %error.class(),
                    error = %error,
                    "Failed to deliver notification"
                );
                false
            }
        }
    }

    /// Report a retryable or soft failure, if enabled.
    async fn report_failure(&mut self, message: String) {
        if self.config.notify_on_errors {
            self.notify_failure(message, true).await;
        }
    }

    /// Best-effort failure notification. With `distinct`, a text identical to
    /// the last reported failure is not sent again.
    async fn notify_failure(&mut self, message: String, distinct: bool) {
        if distinct && self.last_failure.as_deref() == Some(message.as_str()) {
            debug!("Failure already reported, not notifying again");
            return;
        }

        self.deliver(&message).await;
        self.last_failure = Some(message);
    }
}
