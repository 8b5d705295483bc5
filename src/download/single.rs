//! Single-file download.

use std::path::PathBuf;
use std::sync::Arc;

use crate::download::capability::ResolvedCapability;
use crate::download::fetch::{fetch_bytes, fetch_timeout};
use crate::download::session::DownloadSession;
use crate::download::task::DownloadTask;
use crate::error::{Error, Result};
use crate::host::cancel::CancelToken;
use crate::host::transport::HttpTransport;

/// Outcome of a successful single download.
#[derive(Debug, Clone)]
pub struct SingleOutcome {
    pub filename: String,
    pub path: PathBuf,
}

/// Download one file: bytes come from the task's prefetched content or are
/// streamed from the URL, then written via the detected capability.
///
/// Fails on cancellation, missing capability, a busy session, or a fetch/
/// save error; the caller decides which of those are user-visible.
pub async fn download_single(
    transport: &Arc<dyn HttpTransport>,
    capability: &ResolvedCapability,
    session: &Arc<DownloadSession>,
    task: DownloadTask,
    cancel: &CancelToken,
) -> Result<SingleOutcome> {
    if !capability.is_available() {
        return Err(Error::CapabilityUnavailable);
    }

    let guard = session.acquire(1)?;
    guard.task_started();

    let url = task.url.clone();
    let result = async move {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let bytes = match task.bytes {
            Some(bytes) => bytes,
            None => {
                fetch_bytes(
                    transport.as_ref(),
                    &task.url,
                    fetch_timeout(capability.kind()),
                    cancel,
                )
                .await?
            }
        };

        let path = capability.save(&bytes, &task.desired_filename).await?;
        Ok(SingleOutcome {
            filename: task.desired_filename.clone(),
            path,
        })
    }
    .await;

    guard.task_finished();

    match &result {
        Ok(outcome) => tracing::info!(filename = %outcome.filename, "download complete"),
        Err(e) if e.is_cancelled() => tracing::debug!("download cancelled"),
        Err(e) => tracing::warn!(url = %url, "download failed: {}", e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::capability::{CapabilityKind, HostEnv};
    use crate::host::save::SaveTarget;
    use crate::host::transport::{HttpRequest, HttpResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MemorySave {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl MemorySave {
        fn new() -> Self {
            Self {
                saved: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SaveTarget for MemorySave {
        async fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf> {
            self.saved
                .lock()
                .unwrap()
                .push((filename.to_string(), bytes.to_vec()));
            Ok(PathBuf::from(filename))
        }
    }

    struct StaticTransport {
        body: Vec<u8>,
    }

    #[async_trait]
    impl HttpTransport for StaticTransport {
        async fn request(&self, _request: HttpRequest) -> Result<HttpResponse> {
            Ok(HttpResponse {
                status: 200,
                body: self.body.clone(),
            })
        }
    }

    struct PanicTransport;

    #[async_trait]
    impl HttpTransport for PanicTransport {
        async fn request(&self, _request: HttpRequest) -> Result<HttpResponse> {
            panic!("transport must not be used for prefetched tasks");
        }
    }

    fn native_env(save: Arc<MemorySave>) -> ResolvedCapability {
        ResolvedCapability::detect(&HostEnv {
            native_save: Some(save),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_fetches_and_saves() {
        let save = Arc::new(MemorySave::new());
        let capability = native_env(save.clone());
        let transport: Arc<dyn HttpTransport> = Arc::new(StaticTransport {
            body: b"image-bytes".to_vec(),
        });
        let session = DownloadSession::new();

        let outcome = download_single(
            &transport,
            &capability,
            &session,
            DownloadTask::new("https://h/a.jpg", "author_1_1.jpg"),
            &CancelToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.filename, "author_1_1.jpg");
        let saved = save.saved.lock().unwrap();
        assert_eq!(saved[0].1, b"image-bytes");
        // Session released once the task drained.
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn test_prefetched_bytes_skip_network() {
        let save = Arc::new(MemorySave::new());
        let capability = native_env(save.clone());
        let transport: Arc<dyn HttpTransport> = Arc::new(PanicTransport);
        let session = DownloadSession::new();

        let task =
            DownloadTask::new("https://h/a.jpg", "a.jpg").with_bytes(b"cached".to_vec());
        download_single(&transport, &capability, &session, task, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(save.saved.lock().unwrap()[0].1, b"cached");
    }

    #[tokio::test]
    async fn test_no_capability_is_fatal() {
        let capability = ResolvedCapability::detect(&HostEnv::default());
        assert_eq!(capability.kind(), CapabilityKind::None);
        let transport: Arc<dyn HttpTransport> = Arc::new(StaticTransport { body: vec![] });
        let session = DownloadSession::new();

        let result = download_single(
            &transport,
            &capability,
            &session,
            DownloadTask::new("https://h/a.jpg", "a.jpg"),
            &CancelToken::new(),
        )
        .await;
        assert!(matches!(result, Err(Error::CapabilityUnavailable)));
    }

    #[tokio::test]
    async fn test_cancelled_before_fetch() {
        let save = Arc::new(MemorySave::new());
        let capability = native_env(save.clone());
        let transport: Arc<dyn HttpTransport> = Arc::new(StaticTransport { body: vec![] });
        let session = DownloadSession::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = download_single(
            &transport,
            &capability,
            &session,
            DownloadTask::new("https://h/a.jpg", "a.jpg"),
            &cancel,
        )
        .await;
        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(save.saved.lock().unwrap().is_empty());
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn test_busy_session_rejected() {
        let save = Arc::new(MemorySave::new());
        let capability = native_env(save);
        let transport: Arc<dyn HttpTransport> = Arc::new(StaticTransport { body: vec![] });
        let session = DownloadSession::new();
        let _held = session.acquire(1).unwrap();

        let result = download_single(
            &transport,
            &capability,
            &session,
            DownloadTask::new("https://h/a.jpg", "a.jpg"),
            &CancelToken::new(),
        )
        .await;
        assert!(matches!(result, Err(Error::SessionBusy)));
    }
}
