//! Request transport.
//!
//! Every network call in the crate goes through [`Transport::send`]. The
//! transport owns connection reuse, authentication headers and timeouts;
//! callers see only a status code and a JSON body.

mod http;

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BrokerError, BrokerResult};

pub use http::HttpTransport;

/// HTTP methods used by the v20 API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Patch => write!(f, "PATCH"),
        }
    }
}

/// A status code and the decoded JSON body of a response.
///
/// An empty body decodes to `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a status of 400 or above into [`BrokerError::Remote`].
    ///
    /// The message is the body's `errorMessage` when present, else the body
    /// as text.
    pub fn error_for_status(self) -> BrokerResult<Self> {
        if self.status < 400 {
            return Ok(self);
        }
        let message = match self.body.get("errorMessage").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => match &self.body {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            },
        };
        Err(BrokerError::remote(self.status, message))
    }

    /// Deserialize the object under `key`.
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> BrokerResult<T> {
        let value = self
            .body
            .get(key)
            .ok_or_else(|| BrokerError::Parse(format!("Response has no '{}' field", key)))?;
        T::deserialize(value)
            .map_err(|e| BrokerError::Parse(format!("Invalid '{}' in response: {}", key, e)))
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations must not retry and must return responses of any status;
/// status interpretation happens in the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> BrokerResult<TransportResponse>;
}
