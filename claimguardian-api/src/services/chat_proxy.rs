//! Forwards chat requests to another chat route.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use service_core::error::AppError;
use service_core::observability::TracedClientExt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatProxyError {
    #[error("Chat upstream unreachable: {0}")]
    Unreachable(String),

    #[error("Chat upstream returned a non-JSON body (status {0})")]
    NotJson(u16),
}

impl From<ChatProxyError> for AppError {
    fn from(err: ChatProxyError) -> Self {
        match err {
            ChatProxyError::Unreachable(_) => AppError::ServiceUnavailable(err.to_string()),
            ChatProxyError::NotJson(_) => AppError::BadGateway(err.to_string()),
        }
    }
}

pub struct ChatProxyClient {
    client: Client,
    url: String,
}

impl ChatProxyClient {
    pub fn new(url: String, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, url })
    }

    /// Returns the upstream status and JSON body unchanged.
    pub async fn forward(&self, body: &Value) -> Result<(StatusCode, Value), ChatProxyError> {
        let response = self
            .client
            .traced_post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %self.url, error = %e, "Chat proxy request failed");
                ChatProxyError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        let payload = response
            .json::<Value>()
            .await
            .map_err(|_| ChatProxyError::NotJson(status.as_u16()))?;

        Ok((status, payload))
    }
}
