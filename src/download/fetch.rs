//! Byte fetching with retry and exponential backoff.

use std::time::Duration;

use rand::Rng;

use crate::download::capability::CapabilityKind;
use crate::error::{Error, Result};
use crate::host::cancel::CancelToken;
use crate::host::transport::{HttpRequest, HttpTransport};

/// Fixed fetch timeout applied on the fetch-and-save fallback path.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Base delay for exponential retry backoff.
pub const BACKOFF_BASE_MS: u64 = 200;

/// The fallback path gets a fixed timeout; the native path relies on the
/// host primitive's own handling.
pub fn fetch_timeout(kind: CapabilityKind) -> Option<Duration> {
    matches!(kind, CapabilityKind::FetchAndSave).then_some(FETCH_TIMEOUT)
}

/// One fetch attempt. Non-2xx statuses are failures.
pub async fn fetch_bytes(
    transport: &dyn HttpTransport,
    url: &str,
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> Result<Vec<u8>> {
    let mut request = HttpRequest::get(url).cancel_token(cancel);
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let response = transport.request(request).await?;
    if !response.is_success() {
        return Err(Error::Download(format!(
            "HTTP {} fetching {}",
            response.status, url
        )));
    }
    Ok(response.body)
}

/// Fetch with up to `retries` additional attempts, backing off
/// exponentially (200ms, 400ms, ...) with a little jitter. The abort
/// signal is checked before every attempt and cancellation is never
/// retried.
pub async fn fetch_with_retry(
    transport: &dyn HttpTransport,
    url: &str,
    timeout: Option<Duration>,
    cancel: &CancelToken,
    retries: u32,
) -> Result<Vec<u8>> {
    let mut attempt = 0u32;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        match fetch_bytes(transport, url, timeout, cancel).await {
            Ok(bytes) => return Ok(bytes),
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(error) if attempt < retries => {
                let backoff = BACKOFF_BASE_MS << attempt;
                let jitter = rand::thread_rng().gen_range(0..50);
                tracing::debug!(
                    url,
                    attempt,
                    "fetch failed ({}), retrying in {}ms",
                    error,
                    backoff + jitter
                );
                tokio::time::sleep(Duration::from_millis(backoff + jitter)).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
