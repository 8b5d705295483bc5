//! Cross-origin HTTP requester interface and the reqwest-backed host
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Error, Result};
use crate::host::cancel::CancelToken;

/// HTTP method subset used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single outgoing request.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: Option<HttpMethod>,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
    /// Abort signal; an in-flight request is dropped when it fires.
    pub cancel: Option<CancelToken>,
}

impl HttpRequest {
    /// Build a GET request for a URL.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Some(HttpMethod::Get),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Build a POST request for a URL.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Some(HttpMethod::Post),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach an abort signal.
    pub fn cancel_token(mut self, token: &CancelToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }
}

/// A completed response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Interpret the body as UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Host-provided HTTP requester.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a request, honoring its timeout and abort signal.
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Production transport built on reqwest.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given user agent.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method.unwrap_or(HttpMethod::Get) {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let send = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();
            Ok(HttpResponse { status, body })
        };

        match request.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(Error::Cancelled),
                result = send => result,
            },
            None => send.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_success() {
        let ok = HttpResponse {
            status: 200,
            body: Vec::new(),
        };
        let redirect = HttpResponse {
            status: 304,
            body: Vec::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }

    #[test]
    fn test_request_builder() {
        let token = CancelToken::new();
        let request = HttpRequest::get("https://example.com/a")
            .header("x-test", "1")
            .timeout(Duration::from_secs(5))
            .cancel_token(&token);

        assert_eq!(request.method, Some(HttpMethod::Get));
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
        assert!(request.cancel.is_some());
    }
}
