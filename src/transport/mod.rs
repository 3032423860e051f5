//! Transport layer for backend calls
//!
//! One generic primitive: operation name + JSON body in, status code + JSON
//! body out. Connection-level failures surface as `Error::TransportFailure`;
//! status interpretation is left to the caller.

mod http;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::protocol::Operation;

pub use http::HttpTransport;
#[cfg(test)]
pub use mock::MockTransport;

/// Raw backend response
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Decoded JSON body; non-JSON bodies are kept as a string value
    pub body: Value,
}

impl TransportResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Short description of the body for error messages
    pub fn body_excerpt(&self) -> String {
        let text = match &self.body {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        if text.chars().count() > 200 {
            let cut: String = text.chars().take(200).collect();
            format!("{}...", cut)
        } else {
            text
        }
    }
}

/// Generic JSON-over-HTTP call primitive
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one call; `Err` only when the backend could not be reached
    async fn call(&self, operation: Operation, body: Value) -> Result<TransportResponse>;
}
