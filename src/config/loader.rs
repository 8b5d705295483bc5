//! Configuration structures and loading logic.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// Session credentials configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session CSRF token (the `ct0` cookie value). Optional; anonymous
    /// lookups work for public posts.
    #[serde(default)]
    pub csrf_token: Option<String>,

    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads; the user's download folder when unset.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    /// Concurrent fetches during bulk download.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Retry attempts per item.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Whether to show per-download progress output.
    #[serde(default = "default_true")]
    pub show_downloads: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            csrf_token: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            output_directory: None,
            concurrency: default_concurrency(),
            retries: default_retries(),
            show_downloads: true,
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36".to_string()
}

fn default_concurrency() -> usize {
    crate::download::bulk::DEFAULT_CONCURRENCY
}

fn default_retries() -> u32 {
    crate::download::bulk::DEFAULT_RETRIES
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Effective download directory: configured value, else the user's
    /// download folder, else the current directory.
    pub fn output_directory(&self) -> PathBuf {
        if let Some(dir) = &self.options.output_directory {
            return dir.clone();
        }
        directories::UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
