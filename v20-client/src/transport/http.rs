//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde_json::Value;
use tracing::debug;

use super::{HttpMethod, Transport, TransportResponse};
use crate::config::RestConfig;
use crate::error::{BrokerError, BrokerResult};

/// HTTP transport for the v20 REST API.
///
/// Sends `Authorization: Bearer <token>` and `Content-Type: application/json`
/// on every request. One connection pool is shared by all calls.
///
/// # Example
///
/// ```ignore
/// let transport = HttpTransport::new(
///     "https://api-fxpractice.oanda.com/v3/accounts",
///     token,
///     RestConfig::default(),
/// )?;
/// let response = transport.send(HttpMethod::Get, "/101-004-1/summary", None, &[]).await?;
/// ```
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a new transport.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Accounts base URL, without a trailing slash
    /// * `access_token` - Bearer token
    /// * `config` - REST configuration (timeout)
    pub fn new(
        base_url: impl Into<String>,
        access_token: &str,
        config: &RestConfig,
    ) -> BrokerResult<Self> {
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|_| BrokerError::Configuration("Access token is not a valid header".into()))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| BrokerError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_response(response: Response) -> BrokerResult<TransportResponse> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| BrokerError::Request(format!("Failed to read response: {}", e)))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => value,
                // Error pages from proxies are not JSON; keep them for the message.
                Err(_) if status >= 400 => Value::String(text),
                Err(e) => {
                    return Err(BrokerError::Parse(format!(
                        "Failed to parse response: {} - body: {}",
                        e, text
                    )))
                }
            }
        };

        debug!(status, "response received");
        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> BrokerResult<TransportResponse> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("{} {}", method, endpoint);

        let mut request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Patch => self.client.patch(&url),
        };
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BrokerError::Request(format!("Request timed out: {} {}", method, endpoint))
            } else {
                BrokerError::Request(e.to_string())
            }
        })?;

        Self::read_response(response).await
    }
}
