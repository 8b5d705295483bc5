//! Download task input.

use crate::media::record::MediaRecord;

/// Input to single and bulk download.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// Source URL.
    pub url: String,

    /// Filename to save under (pre-sanitized; collisions are resolved at
    /// archive time).
    pub desired_filename: String,

    /// Pre-fetched content, when a cache already holds the bytes. Skips
    /// the network entirely.
    pub bytes: Option<Vec<u8>>,
}

impl DownloadTask {
    pub fn new(url: impl Into<String>, desired_filename: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            desired_filename: desired_filename.into(),
            bytes: None,
        }
    }

    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.bytes = Some(bytes);
        self
    }
}

impl From<&MediaRecord> for DownloadTask {
    fn from(record: &MediaRecord) -> Self {
        Self::new(record.url.clone(), record.filename.clone())
    }
}
