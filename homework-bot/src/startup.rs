//! Startup checks that run before the poller exists.

use std::time::Duration;

use tracing::{error, warn};

use crate::config::{BotConfig, Cli};
use crate::notifier::{Notifier, TelegramNotifier};
use crate::poller::failure_message;
use crate::utils::http_client;
use crate::Result;

/// Notifier for reporting a configuration failure, if the Telegram half of
/// the configuration is usable on its own.
pub fn fallback_notifier(cli: &Cli) -> Option<TelegramNotifier> {
    let telegram = cli.telegram_config()?;
    let timeout = Duration::from_secs(cli.request_timeout_secs.max(1));
    match http_client::build_client(timeout) {
        Ok(client) => Some(TelegramNotifier::new(telegram, client)),
        Err(e) => {
            warn!(error = %e, "Cannot build HTTP client for the failure notification");
            None
        }
    }
}

/// Resolve the configuration. On failure the error is logged, reported once
/// through `notifier` when one is available, and returned.
pub async fn resolve_config<N>(cli: &Cli, notifier: Option<&N>) -> Result<BotConfig>
where
    N: Notifier + ?Sized,
{
    let error = match cli.resolve() {
        Ok(config) => return Ok(config),
        Err(error) => error,
    };

    error!(class = %error.class(), error = %error, "Invalid configuration, exiting");

    match notifier {
        Some(notifier) => {
            if let Err(e) = notifier.deliver(&failure_message(&error)).await {
                warn!(error = %e, "Failed to report the configuration failure");
            }
        }
        None => {
            warn!("Telegram credentials unavailable, cannot report the configuration failure");
        }
    }

    Err(error)
}
