//! Transport seam
//!
//! The client never talks to the network itself: every synthesized request
//! is handed to a [`Transport`], which returns the response status, headers
//! and raw body untouched. [`HttpTransport`] is the default implementation on
//! top of `reqwest`.

use crate::request::HttpRequest;
use async_trait::async_trait;
use discovery_client_common::{ClientConfig, ClientError, Result, TransportError};
use std::time::Duration;
use tracing::{instrument, Span};

/// Response as returned by a transport, not interpreted by the client
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers in received order, lower-cased names, repeats kept
    pub headers: Vec<(String, String)>,

    /// Raw response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Returns `true` for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// First value of a header, by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    /// Every value of a header, by case-insensitive name
    pub fn header_values<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Executes HTTP requests on behalf of the client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform `request` and return the response verbatim.
    ///
    /// Non-2xx statuses are responses, not errors; only failures to obtain a
    /// response at all are reported as [`TransportError`].
    async fn request(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// Default transport built on `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport honoring the configured timeout and user agent
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10);

        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Transport(TransportError::Request(Box::new(e))))?;

        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(
        name = "http_request",
        skip(self, request),
        fields(
            http.method = %request.method,
            http.url = %request.url,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        )
    )]
    async fn request(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<RawResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|e| {
            TransportError::Other(format!("invalid HTTP method '{}': {}", request.method, e))
        })?;

        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            let bytes = body
                .to_bytes()
                .map_err(|e| TransportError::Request(Box::new(e)))?;
            builder = builder.body(bytes.into_owned());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(Box::new(e)))?;

        let status = response.status().as_u16();
        Span::current().record("http.status_code", status);

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(Box::new(e)))?
            .to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_response_helpers() {
        let response = RawResponse {
            status: 201,
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("set-cookie".to_string(), "a=1".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
            ],
            body: br#"{"name":"hello.service"}"#.to_vec(),
        };

        assert!(response.is_success());
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("Set-Cookie"), Some("a=1"));
        assert_eq!(
            response.header_values("set-cookie").collect::<Vec<_>>(),
            vec!["a=1", "b=2"]
        );
        assert_eq!(response.header_values("x-missing").count(), 0);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["name"], "hello.service");
        assert_eq!(response.text(), r#"{"name":"hello.service"}"#);
    }

    #[test]
    fn test_non_success_status() {
        let response = RawResponse {
            status: 404,
            ..Default::default()
        };
        assert!(!response.is_success());
    }

    #[test]
    fn test_http_transport_builds_from_config() {
        let config = ClientConfig {
            user_agent: Some("discoctl/0.1".to_string()),
            ..Default::default()
        };
        assert!(HttpTransport::new(&config).is_ok());
    }
}
