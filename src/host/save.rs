//! "Save file" primitive interface.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Host-provided save primitive: persist finished bytes under a filename.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Write the bytes and return where they ended up.
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf>;
}

/// Filesystem-backed save target for the CLI host.
pub struct FsSaveTarget {
    directory: PathBuf,
}

impl FsSaveTarget {
    /// Save files under the given directory, created on first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl SaveTarget for FsSaveTarget {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf> {
        // Filenames are sanitized upstream, but never allow one to escape
        // the target directory.
        if filename.is_empty() || filename.contains('/') || filename.contains('\\') {
            return Err(Error::InvalidFilename(filename.to_string()));
        }

        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(filename);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}
