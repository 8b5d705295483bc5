//! Authentication headers and token handling for the GraphQL API.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::types::GuestTokenResponse;
use crate::error::Result;
use crate::host::store::KeyValueStore;
use crate::host::transport::{HttpRequest, HttpTransport};

/// Public bearer credential the web client ships with. Fixed by the remote
/// contract.
pub const BEARER_TOKEN: &str = "Bearer AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";

/// Guest token activation endpoint.
const GUEST_ACTIVATE_URL: &str = "https://api.twitter.com/1.1/guest/activate.json";

/// Store key holding the session CSRF token (the `ct0` cookie value).
pub const CSRF_TOKEN_KEY: &str = "ct0";

/// Store key holding a previously activated guest token.
pub const GUEST_TOKEN_KEY: &str = "gt";

/// Session authentication state: CSRF token from the host's token store
/// plus an optionally activated guest token.
pub struct SessionAuth {
    store: Arc<dyn KeyValueStore>,
    guest_token: RwLock<Option<String>>,
}

impl SessionAuth {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let guest_token = RwLock::new(store.get(GUEST_TOKEN_KEY));
        Self { store, guest_token }
    }

    /// Current CSRF token, or empty when the session has none.
    pub fn csrf_token(&self) -> String {
        self.store.get(CSRF_TOKEN_KEY).unwrap_or_default()
    }

    /// Refresh the CSRF token from a newly observed cookie value.
    pub fn refresh_csrf_token(&self, value: String) {
        self.store.set(CSRF_TOKEN_KEY, value);
    }

    /// Headers required by the GraphQL endpoint.
    pub async fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            ("authorization".to_string(), BEARER_TOKEN.to_string()),
            ("x-csrf-token".to_string(), self.csrf_token()),
            ("x-twitter-active-user".to_string(), "yes".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
        ];

        match self.guest_token.read().await.as_deref() {
            Some(token) => headers.push(("x-guest-token".to_string(), token.to_string())),
            None => headers.push((
                "x-twitter-auth-type".to_string(),
                "OAuth2Session".to_string(),
            )),
        }

        headers
    }

    /// Request a guest token from the activation endpoint when the session
    /// has none. Fail-soft: activation errors are logged and the request
    /// proceeds without an explicit guest token.
    pub async fn activate_guest_token_if_needed(&self, transport: &dyn HttpTransport) {
        if self.guest_token.read().await.is_some() {
            return;
        }

        let request = HttpRequest::post(GUEST_ACTIVATE_URL)
            .header("authorization", BEARER_TOKEN)
            .header("content-type", "application/json");

        match self.activate(transport, request).await {
            Ok(Some(token)) => {
                tracing::debug!("guest token activated");
                self.store.set(GUEST_TOKEN_KEY, token.clone());
                *self.guest_token.write().await = Some(token);
            }
            Ok(None) => tracing::debug!("guest activation returned no token"),
            Err(e) => tracing::debug!("guest activation failed: {}", e),
        }
    }

    async fn activate(
        &self,
        transport: &dyn HttpTransport,
        request: HttpRequest,
    ) -> Result<Option<String>> {
        let response = transport.request(request).await?;
        if !response.is_success() {
            return Ok(None);
        }
        let parsed: GuestTokenResponse = serde_json::from_slice(&response.body)?;
        Ok(parsed.guest_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::store::MemoryStore;

    #[tokio::test]
    async fn test_csrf_token_from_store() {
        let store = Arc::new(MemoryStore::new());
        store.set(CSRF_TOKEN_KEY, "csrf-value".to_string());

        let auth = SessionAuth::new(store);
        assert_eq!(auth.csrf_token(), "csrf-value");

        let headers = auth.request_headers().await;
        assert!(headers
            .iter()
            .any(|(k, v)| k == "x-csrf-token" && v == "csrf-value"));
    }

    #[tokio::test]
    async fn test_headers_without_guest_token() {
        let auth = SessionAuth::new(Arc::new(MemoryStore::new()));
        let headers = auth.request_headers().await;

        assert!(headers
            .iter()
            .any(|(k, v)| k == "authorization" && v == BEARER_TOKEN));
        assert!(headers
            .iter()
            .any(|(k, v)| k == "x-twitter-auth-type" && v == "OAuth2Session"));
        assert!(headers
            .iter()
            .any(|(k, v)| k == "x-twitter-active-user" && v == "yes"));
        assert!(!headers.iter().any(|(k, _)| k == "x-guest-token"));
    }

    #[tokio::test]
    async fn test_headers_with_stored_guest_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(GUEST_TOKEN_KEY, "guest-123".to_string());

        let auth = SessionAuth::new(store);
        let headers = auth.request_headers().await;
        assert!(headers
            .iter()
            .any(|(k, v)| k == "x-guest-token" && v == "guest-123"));
        assert!(!headers.iter().any(|(k, _)| k == "x-twitter-auth-type"));
    }

    #[tokio::test]
    async fn test_refresh_csrf_token() {
        let auth = SessionAuth::new(Arc::new(MemoryStore::new()));
        assert_eq!(auth.csrf_token(), "");
        auth.refresh_csrf_token("fresh".to_string());
        assert_eq!(auth.csrf_token(), "fresh");
    }
}
