use std::{sync::OnceLock, time::Duration};

use tracing::debug;

use crate::{Error, Result};

/// Upper bound for establishing a connection, independent of the request timeout.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Safe to ignore: can happen if another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Build the `reqwest::Client` shared by the status client and the notifier.
///
/// Every request made through it is bounded by `request_timeout`, so a hung
/// endpoint cannot stall a poll cycle.
pub fn build_client(request_timeout: Duration) -> Result<reqwest::Client> {
    if request_timeout.is_zero() {
        return Err(Error::config("request timeout must be greater than zero"));
    }

    install_rustls_provider();

    reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(request_timeout.min(MAX_CONNECT_TIMEOUT))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Other(format!("Failed to build HTTP client: {}", e)))
}
