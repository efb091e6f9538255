//! Application-wide error types.
//!
//! Every failure the bot can hit is one of a closed set of kinds. Each kind
//! carries an [`ErrorClass`] that tells the poll loop whether to abort, retry
//! the same window, or log and move on.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// How the poll loop reacts to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorClass {
    /// Terminates the process after a best-effort notification.
    Fatal,
    /// Logged; the next cycle retries with the same cursor.
    Retryable,
    /// Logged and recovered from within the same cycle.
    Soft,
}

/// Failure of a single status API request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// HTTP 401/403. Credentials are wrong and will not fix themselves.
    #[error("invalid credentials")]
    AuthInvalid { status: u16 },

    /// Any other non-200 response.
    #[error("status API returned HTTP {code}")]
    ServiceUnavailable { code: u16 },

    /// DNS, connect, TLS or timeout failure.
    #[error("status API request failed: {0}")]
    Transport(String),

    /// HTTP 200 whose body is not JSON.
    #[error("status API returned an undecodable body: {0}")]
    Decode(String),
}

impl FetchError {
    /// Rejected credentials are fatal; everything else is worth another try.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::AuthInvalid { .. } => ErrorClass::Fatal,
            Self::ServiceUnavailable { .. } | Self::Transport(_) | Self::Decode(_) => {
                ErrorClass::Retryable
            }
        }
    }
}

/// The decoded payload does not have the expected shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("API response is not a mapping (got {found})")]
    NotAMapping { found: &'static str },

    #[error("API response is missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("API response contains a malformed item: {0}")]
    MalformedItem(String),
}

impl ValidationError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Retryable
    }
}

/// A validated record could not be turned into a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretationError {
    #[error("undocumented status `{code}` for homework `{item}`")]
    UnknownStatus { item: String, code: String },
}

impl InterpretationError {
    /// Re-fetching cannot change an undocumented code.
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Soft
    }
}

/// The messaging channel did not accept a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("message delivery failed: {0}")]
    ChannelFailure(String),

    #[error("message delivery rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

impl DeliveryError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Soft
    }
}

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required configuration: {}", names.join(", "))]
    ConfigMissing { names: Vec<&'static str> },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Interpretation(#[from] InterpretationError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("IO error while {op} at {}: {source}", path.display())]
    IoPath {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn io_path(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::IoPath {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Classify this error for the poll loop.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ConfigMissing { .. } | Self::Configuration(_) => ErrorClass::Fatal,
            Self::Fetch(e) => e.class(),
            Self::Validation(e) => e.class(),
            Self::Interpretation(e) => e.class(),
            Self::Delivery(e) => e.class(),
            Self::IoPath { .. } | Self::Other(_) => ErrorClass::Soft,
        }
    }
}
