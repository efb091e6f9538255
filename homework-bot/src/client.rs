//! Status API client.
//!
//! One `GET <endpoint>?from_date=<cursor>` per call. The decoded JSON is
//! returned as-is; shape checks belong to [`crate::validator`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::BotConfig;
use crate::domain::Cursor;
use crate::error::FetchError;

/// Source of raw status payloads.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch everything updated since `cursor`.
    async fn fetch(&self, cursor: &Cursor) -> Result<Value, FetchError>;
}

/// HTTP client for the homework status API.
pub struct StatusClient {
    client: Client,
    endpoint: Url,
    token: String,
}

impl StatusClient {
    /// Create a client on top of an already configured `reqwest::Client`.
    ///
    /// The client's timeout bounds every fetch.
    pub fn new(client: Client, endpoint: Url, token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint,
            token: token.into(),
        }
    }

    pub fn from_config(client: Client, config: &BotConfig) -> Self {
        Self::new(
            client,
            config.endpoint.clone(),
            config.practicum_token.clone(),
        )
    }
}

/// Map a non-200 status to its error kind.
fn classify_status(status: StatusCode) -> FetchError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::AuthInvalid {
            status: status.as_u16(),
        },
        other => FetchError::ServiceUnavailable {
            code: other.as_u16(),
        },
    }
}

fn transport_error(error: reqwest::Error) -> FetchError {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    FetchError::Transport(format!("{}: {}", kind, error))
}

#[async_trait]
impl StatusSource for StatusClient {
    async fn fetch(&self, cursor: &Cursor) -> Result<Value, FetchError> {
        debug!(endpoint = %self.endpoint, cursor = %cursor, "Requesting homework statuses");

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", cursor.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(classify_status(status));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED, FetchError::AuthInvalid { status: 401 })]
    #[case(StatusCode::FORBIDDEN, FetchError::AuthInvalid { status: 403 })]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, FetchError::ServiceUnavailable { code: 500 })]
    #[case(StatusCode::NOT_FOUND, FetchError::ServiceUnavailable { code: 404 })]
    #[case(StatusCode::NO_CONTENT, FetchError::ServiceUnavailable { code: 204 })]
    fn test_classify_status(#[case] status: StatusCode, #[case] expected: FetchError) {
        assert_eq!(classify_status(status), expected);
    }
}
