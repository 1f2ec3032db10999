pub mod body;
pub mod client;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{EXPECT, HeaderMap, HeaderName, HeaderValue, TRANSFER_ENCODING};
use tracing::debug;

use crate::models::{Method, RuntimeError, WireRequest, WireResponse};

pub use body::PayloadCursor;
pub use client::build_client;

/// Trait for performing one HTTP exchange, so the protocol client can be
/// exercised without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs `request` and collects the full response.
    ///
    /// # Errors
    ///
    /// Returns an error if no complete response was received from the peer.
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, RuntimeError>;
}

/// Production transport backed by one long-lived `reqwest::Client`.
///
/// Each exchange starts from a fresh request builder, so options set for a
/// report never carry over into the next poll.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a transport with the protocol's connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built.
    pub fn with_defaults() -> Result<Self, RuntimeError> {
        Ok(Self::new(build_client()?))
    }

    async fn send(&self, request: WireRequest) -> anyhow::Result<WireResponse> {
        let WireRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self
                .client
                .post(&url)
                .body(reqwest::Body::wrap_stream(PayloadCursor::new(body))),
        };

        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (key, value) in &headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .with_context(|| format!("Invalid header name: {key}"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {key}"))?;
            header_map.insert(name, value);
        }
        // The control endpoint expects the body immediately and unchunked.
        header_map.remove(EXPECT);
        header_map.remove(TRANSFER_ENCODING);

        let mut response = builder
            .headers(header_map)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let mut wire = WireResponse::new(response.status().as_u16());
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            debug!("received header: {}: {}", name, value);
            wire.add_header(name.as_str(), &value);
        }
        wire.content_type = wire.header("content-type").unwrap_or_default().to_string();

        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?
        {
            wire.append_body(&chunk);
        }

        Ok(wire)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, RuntimeError> {
        Ok(self.send(request).await?)
    }
}
