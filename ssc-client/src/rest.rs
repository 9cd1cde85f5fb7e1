//! HTTPS REST and event-stream client for generation-2 devices.
//!
//! Devices serve a self-signed certificate and authenticate third-party
//! clients with HTTP Basic auth as user `api` plus the password configured on
//! the device. Every request body and response body is JSON; writes are `PUT`.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{header, Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, Result};

/// User name devices expect for third-party API access.
pub const API_USER: &str = "api";

/// Request timeout applied to ordinary REST calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A chunked response body from the event-stream endpoint.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Request/response transport to a generation-2 device.
#[async_trait]
pub trait RestTransport: Send + Sync {
    /// `GET` a resource and parse the JSON body.
    async fn get(&self, path: &str) -> Result<Value>;

    /// `PUT` a JSON body; an empty response body yields `Value::Null`.
    async fn put(&self, path: &str, body: &Value) -> Result<Value>;

    /// `DELETE` a resource.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Open a long-lived `text/event-stream` response.
    async fn open_event_stream(&self, path: &str) -> Result<EventStream>;
}

/// Connection settings for [`RestClient`].
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Scheme, host and optional port, e.g. `https://192.168.1.20`
    pub base_url: Url,
    /// Third-party API password configured on the device
    pub password: String,
    /// Timeout for ordinary requests; the event stream has none
    pub timeout: Duration,
    /// Accept self-signed device certificates
    pub accept_invalid_certs: bool,
}

impl RestConfig {
    /// HTTPS settings for a device host name or IP.
    pub fn for_host(host: &str, password: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(&format!("https://{}", host))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", host, e)))?;
        Ok(Self {
            base_url,
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: true,
        })
    }
}

/// [`RestTransport`] built on reqwest.
#[derive(Debug, Clone)]
pub struct RestClient {
    config: RestConfig,
    client: Client,
    stream_client: Client,
}

impl RestClient {
    /// Build the HTTP clients for a device.
    pub fn new(config: RestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        // The stream stays open indefinitely, so only the connect phase is bounded
        let stream_client = Client::builder()
            .connect_timeout(config.timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            stream_client,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.config
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn send(&self, client: &Client, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = self.url(path)?;
        debug!(%method, path, "HTTP request");

        let mut request = client
            .request(method.clone(), url)
            .basic_auth(API_USER, Some(&self.config.password));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "HTTP response");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized(path.to_string()));
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response)
    }

    async fn json_body(response: Response) -> Result<Value> {
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RestTransport for RestClient {
    async fn get(&self, path: &str) -> Result<Value> {
        let response = self.send(&self.client, Method::GET, path, None).await?;
        Self::json_body(response).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self.send(&self.client, Method::PUT, path, Some(body)).await?;
        Self::json_body(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.send(&self.client, Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn open_event_stream(&self, path: &str) -> Result<EventStream> {
        let url = self.url(path)?;
        debug!(path, "opening event stream");

        let response = self
            .stream_client
            .get(url)
            .basic_auth(API_USER, Some(&self.config.password))
            .header(header::ACCEPT, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized(path.to_string()));
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ClientError::Network(e.to_string())));
        Ok(Box::pin(stream))
    }
}
