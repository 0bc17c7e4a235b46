//! HTTP transport for gateway requests
//!
//! The client never owns process-wide HTTP state. It is handed a
//! [`Transport`], which in production is a pooled `reqwest` client and in
//! tests can be anything that returns canned bodies.

use crate::{AllinpayError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Raw gateway reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Posts encoded request bodies to the gateway
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` with the given content type
    async fn post(&self, url: &str, content_type: &str, body: String) -> Result<TransportResponse>;
}

/// `reqwest`-backed transport with connection pooling
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with an optional request timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| AllinpayError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, content_type: &str, body: String) -> Result<TransportResponse> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_post_forwards_body_and_content_type() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/gateway")
            .match_header(
                "content-type",
                "application/x-www-form-urlencoded;charset=utf-8",
            )
            .match_body(Matcher::Exact("a=1&b=2".to_string()))
            .with_status(200)
            .with_body("{\"ok\":true}")
            .create_async()
            .await;

        let transport = HttpTransport::new(Some(Duration::from_secs(5))).unwrap();
        let response = transport
            .post(
                &format!("{}/gateway", server.url()),
                "application/x-www-form-urlencoded;charset=utf-8",
                "a=1&b=2".to_string(),
            )
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.body, b"{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_status_is_reported_not_raised() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/gateway")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let transport = HttpTransport::new(None).unwrap();
        let response = transport
            .post(&format!("{}/gateway", server.url()), "text/plain", String::new())
            .await
            .unwrap();

        assert_eq!(response.status, 502);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let transport = HttpTransport::new(Some(Duration::from_secs(2))).unwrap();
        let err = transport
            .post("http://127.0.0.1:1/gateway", "text/plain", String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AllinpayError::Transport { .. }));
    }
}
