//! Download orchestration.
//!
//! This module provides:
//! - Capability detection over the host's save primitives
//! - Single-file download
//! - Bulk download into a ZIP archive with bounded concurrency
//! - Session locking and retry/backoff

pub mod bulk;
pub mod capability;
pub mod fetch;
pub mod session;
pub mod single;
pub mod task;

pub use bulk::{BulkOptions, BulkProgress, BulkResult, BulkStatus, Downloader};
pub use capability::{CapabilityKind, HostEnv, ResolvedCapability};
pub use session::DownloadSession;
pub use single::SingleOutcome;
pub use task::DownloadTask;
