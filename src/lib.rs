//! xcom-downloader - Media downloader for X/Twitter posts
//!
//! This library extracts the media referenced by an X/Twitter post,
//! resolves each item to its highest-quality source URL, and delivers the
//! result as a single file or a ZIP archive of the whole post.
//!
//! # Features
//!
//! - Post identification from URLs, ids or click-target snapshots
//! - GraphQL media graph resolution with response caching
//! - Deduplication, visual ordering and filename generation
//! - Bulk download with bounded concurrency, retry and cancellation
//! - A from-scratch STORE-mode ZIP encoder
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use xcom_downloader::{
//!     locator::{locate_post, ClickTarget},
//!     host::{MemoryStore, ReqwestTransport},
//!     TwitterApi,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let target = ClickTarget::from_post_url("https://x.com/user/status/123");
//!     let reference = locate_post(&target).expect("not a post URL");
//!
//!     let transport = Arc::new(ReqwestTransport::new("Mozilla/5.0")?);
//!     let api = TwitterApi::new(transport, Arc::new(MemoryStore::new()));
//!     let media = api.post_media(&reference.post_id).await?;
//!
//!     // ... normalize and download
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod archive;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod host;
pub mod locator;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::TwitterApi;
pub use archive::ZipWriter;
pub use config::Config;
pub use download::{BulkOptions, BulkResult, BulkStatus, Downloader, DownloadTask};
pub use error::{Error, Result};
pub use locator::{locate_post, ClickTarget, PostReference};
pub use media::{MediaRecord, MediaType, SourceLocation};
