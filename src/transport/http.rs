//! reqwest-backed transport against the agent backend

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::BackendSettings;
use crate::error::{Error, Result};
use crate::protocol::Operation;

use super::{Transport, TransportResponse};

/// HTTP transport posting JSON bodies to `{base_url}/{endpoint}`
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_settings(settings: &BackendSettings) -> Result<Self> {
        Self::new(settings.url.clone(), settings.token.clone(), settings.timeout())
    }

    fn url_for(&self, operation: Operation) -> String {
        format!("{}/{}", self.base_url, operation.endpoint())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, operation: Operation, body: Value) -> Result<TransportResponse> {
        let url = self.url_for(operation);
        let started = Instant::now();

        let mut req = self.client.post(&url).json(&body);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await.map_err(|e| {
            warn!(operation = %operation, error = %e, "Backend unreachable");
            Error::TransportFailure {
                operation: operation.name().to_string(),
                message: e.to_string(),
                timed_out: e.is_timeout(),
            }
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| Error::TransportFailure {
            operation: operation.name().to_string(),
            message: format!("Failed to read response body: {}", e),
            timed_out: e.is_timeout(),
        })?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        debug!(
            operation = %operation,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Backend call completed"
        );

        Ok(TransportResponse { status, body })
    }
}
