use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use homework_bot::client::StatusClient;
use homework_bot::config::Cli;
use homework_bot::notifier::TelegramNotifier;
use homework_bot::poller::{ExitReason, PollerConfig, StatusPoller};
use homework_bot::utils::http_client;
use homework_bot::{logging, panic_hook, shutdown, startup};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let _log_guard = logging::init_logging(&cli.log_config())?;
    panic_hook::install();

    let fallback = startup::fallback_notifier(&cli);
    let Ok(config) = startup::resolve_config(&cli, fallback.as_ref()).await else {
        return Ok(ExitCode::FAILURE);
    };
    info!(config = ?config, "Configuration loaded");

    let client = http_client::build_client(config.request_timeout)?;
    let source = Arc::new(StatusClient::from_config(client.clone(), &config));
    let notifier = Arc::new(TelegramNotifier::new(config.telegram.clone(), client));

    let cancellation_token = CancellationToken::new();
    let signal_listener = shutdown::spawn_signal_listener(cancellation_token.clone());

    let mut poller = StatusPoller::new(
        source,
        notifier,
        PollerConfig::from(&config),
        cancellation_token.clone(),
    );
    let reason = poller.run().await;

    cancellation_token.cancel();
    let _ = signal_listener.await;

    match reason {
        ExitReason::Shutdown => {
            info!("homework-bot stopped");
            Ok(ExitCode::SUCCESS)
        }
        ExitReason::Aborted(reason) => {
            error!(fatal = true, reason = %reason, "homework-bot aborted");
            Ok(ExitCode::FAILURE)
        }
    }
}
