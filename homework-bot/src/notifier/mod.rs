//! Message delivery.
//!
//! Delivery failures are always soft: the poll loop logs them and carries on.

mod telegram;

pub use telegram::{TelegramConfig, TelegramNotifier};

use async_trait::async_trait;

use crate::error::DeliveryError;

/// A channel that can deliver a text message to the configured recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the channel type name.
    fn channel_type(&self) -> &'static str;

    /// Send `message`. `Ok(())` is the acknowledgement; no receipts are read.
    async fn deliver(&self, message: &str) -> Result<(), DeliveryError>;
}
