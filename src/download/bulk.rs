//! Bulk download: bounded-concurrency fan-out into a ZIP archive.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::archive::writer::ZipWriter;
use crate::download::capability::ResolvedCapability;
use crate::download::fetch::{fetch_timeout, fetch_with_retry};
use crate::download::session::DownloadSession;
use crate::download::single::{download_single, SingleOutcome};
use crate::download::task::DownloadTask;
use crate::error::{Error, Result};
use crate::host::cancel::CancelToken;
use crate::host::transport::HttpTransport;
use crate::media::filename::resolve_collision;

/// Default worker count for bulk downloads.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Hard cap on concurrent fetches.
pub const MAX_CONCURRENCY: usize = 8;

/// Default retry attempts per item (in addition to the first try).
pub const DEFAULT_RETRIES: u32 = 3;

/// Progress snapshot reported as each item completes.
#[derive(Debug, Clone)]
pub struct BulkProgress {
    pub current: usize,
    pub total: usize,
    pub filename: Option<String>,
}

/// Bulk download options.
pub struct BulkOptions {
    pub concurrency: usize,
    pub retries: u32,
    /// Archive filename; derived by the caller (`{author}_{postId}.zip`)
    /// or defaulted when absent.
    pub archive_name: Option<String>,
    pub cancel: CancelToken,
    pub progress: Option<Box<dyn Fn(BulkProgress) + Send + Sync>>,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retries: DEFAULT_RETRIES,
            archive_name: None,
            cancel: CancelToken::new(),
            progress: None,
        }
    }
}

/// Aggregate outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStatus {
    AllSucceeded,
    /// Some items failed but the archive was still produced.
    Partial,
    /// No item succeeded; no archive is produced.
    AllFailed,
    /// User-triggered abort mid-batch; distinct from failure.
    Cancelled,
}

/// One failed item.
#[derive(Debug, Clone)]
pub struct BulkFailure {
    pub url: String,
    pub error: String,
}

/// Aggregate result of a bulk download. Per-item failures never fail the
/// batch; callers render partial success from this.
#[derive(Debug)]
pub struct BulkResult {
    pub status: BulkStatus,
    pub files_processed: usize,
    pub files_successful: usize,
    pub failures: Vec<BulkFailure>,
    pub archive_filename: Option<String>,
    pub saved_path: Option<PathBuf>,
}

impl BulkResult {
    pub fn success(&self) -> bool {
        matches!(self.status, BulkStatus::AllSucceeded | BulkStatus::Partial)
    }
}

/// Download orchestrator: owns the transport, the detected capability and
/// the session lock. One instance per pipeline session.
pub struct Downloader {
    transport: Arc<dyn HttpTransport>,
    capability: ResolvedCapability,
    session: Arc<DownloadSession>,
}

impl Downloader {
    pub fn new(transport: Arc<dyn HttpTransport>, capability: ResolvedCapability) -> Self {
        Self {
            transport,
            capability,
            session: DownloadSession::new(),
        }
    }

    pub fn capability(&self) -> &ResolvedCapability {
        &self.capability
    }

    pub fn session(&self) -> &Arc<DownloadSession> {
        &self.session
    }

    /// Download one file. See [`download_single`].
    pub async fn download_single(
        &self,
        task: DownloadTask,
        cancel: &CancelToken,
    ) -> Result<SingleOutcome> {
        download_single(&self.transport, &self.capability, &self.session, task, cancel).await
    }

    /// Download a batch of files into one ZIP archive.
    ///
    /// Fails up front for an empty batch, a missing capability or a busy
    /// session; once the batch is running, per-item failures are collected
    /// into the returned [`BulkResult`] instead of failing the call.
    pub async fn download_bulk(
        &self,
        tasks: Vec<DownloadTask>,
        options: BulkOptions,
    ) -> Result<BulkResult> {
        if tasks.is_empty() {
            return Err(Error::Download("No files to download".into()));
        }
        if !self.capability.is_available() {
            return Err(Error::CapabilityUnavailable);
        }

        let total = tasks.len();
        let guard = self.session.acquire(total)?;
        let correlation_id = Uuid::new_v4();
        tracing::info!(%correlation_id, count = total, "bulk download session started");

        let workers = options.concurrency.clamp(1, MAX_CONCURRENCY).min(total);
        let retries = options.retries;
        let timeout = fetch_timeout(self.capability.kind());
        let cancel = &options.cancel;
        let progress = options.progress.as_deref();

        // Single-writer discipline: every archive append goes through this
        // mutex, collision resolution included.
        let archive = AsyncMutex::new((ZipWriter::new(), HashSet::<String>::new()));
        let failures: Mutex<Vec<BulkFailure>> = Mutex::new(Vec::new());
        let successful = AtomicUsize::new(0);
        let completed = AtomicUsize::new(0);

        stream::iter(tasks.into_iter())
            .for_each_concurrent(workers, |task| {
                let guard = &guard;
                let archive = &archive;
                let failures = &failures;
                let successful = &successful;
                let completed = &completed;
                async move {
                    if cancel.is_cancelled() {
                        return;
                    }
                    guard.task_started();

                    let fetched = match task.bytes {
                        Some(bytes) => Ok(bytes),
                        None => {
                            fetch_with_retry(
                                self.transport.as_ref(),
                                &task.url,
                                timeout,
                                cancel,
                                retries,
                            )
                            .await
                        }
                    };

                    match fetched {
                        Ok(bytes) => {
                            let mut writer = archive.lock().await;
                            let (zip, used_names) = &mut *writer;
                            let entry_name =
                                resolve_collision(&task.desired_filename, used_names);
                            used_names.insert(entry_name.clone());
                            match zip.add_file(&entry_name, &bytes) {
                                Ok(()) => {
                                    successful.fetch_add(1, Ordering::SeqCst);
                                }
                                Err(e) => {
                                    failures.lock().unwrap().push(BulkFailure {
                                        url: task.url.clone(),
                                        error: e.to_string(),
                                    });
                                }
                            }
                        }
                        Err(Error::Cancelled) => {
                            // Aborted items are neither successes nor
                            // failures.
                        }
                        Err(e) => {
                            tracing::warn!(url = %task.url, "item failed: {}", e);
                            failures.lock().unwrap().push(BulkFailure {
                                url: task.url.clone(),
                                error: e.to_string(),
                            });
                        }
                    }

                    guard.task_finished();
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(report) = progress {
                        report(BulkProgress {
                            current: done,
                            total,
                            filename: Some(task.desired_filename.clone()),
                        });
                    }
                }
            })
            .await;

        let failures = failures.into_inner().unwrap();
        let files_successful = successful.load(Ordering::SeqCst);
        let (zip, _) = archive.into_inner();

        if options.cancel.is_cancelled() {
            tracing::info!(%correlation_id, "bulk download cancelled");
            return Ok(BulkResult {
                status: BulkStatus::Cancelled,
                files_processed: total,
                files_successful,
                failures,
                archive_filename: None,
                saved_path: None,
            });
        }

        if files_successful == 0 {
            tracing::error!(%correlation_id, count = total, "all downloads failed");
            return Ok(BulkResult {
                status: BulkStatus::AllFailed,
                files_processed: total,
                files_successful: 0,
                failures,
                archive_filename: None,
                saved_path: None,
            });
        }

        let archive_name = options.archive_name.unwrap_or_else(|| {
            format!("media_{}.zip", chrono::Utc::now().format("%Y%m%d%H%M%S"))
        });
        let archive_bytes = zip.finish();
        let saved_path = self.capability.save(&archive_bytes, &archive_name).await?;

        let status = if failures.is_empty() {
            BulkStatus::AllSucceeded
        } else {
            BulkStatus::Partial
        };
        tracing::info!(
            %correlation_id,
            archive = %archive_name,
            successful = files_successful,
            failed = failures.len(),
            "bulk download complete"
        );

        Ok(BulkResult {
            status,
            files_processed: total,
            files_successful,
            failures,
            archive_filename: Some(archive_name),
            saved_path: Some(saved_path),
        })
    }
}
