//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// X/Twitter media downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "xcom-downloader",
    version,
    about = "Download media from X/Twitter posts",
    long_about = "A CLI tool to download photos and videos from X/Twitter posts.\n\n\
                  Single media items are saved directly; posts with multiple items\n\
                  are packaged into a ZIP archive."
)]
pub struct Args {
    /// Post URL or numeric post ID to download media from.
    pub post: String,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub output_directory: Option<PathBuf>,

    /// Session CSRF token (ct0 cookie value).
    #[arg(long, env = "XCOM_CSRF_TOKEN")]
    pub csrf_token: Option<String>,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent", env = "XCOM_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Download only the item at this zero-based position instead of the
    /// whole post.
    #[arg(long)]
    pub item: Option<usize>,

    /// Archive filename for bulk downloads.
    #[arg(long = "zip-name")]
    pub zip_name: Option<String>,

    /// Number of concurrent fetches for bulk downloads.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Retry attempts per item.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Hide download progress information.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where
    /// specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(token) = &self.csrf_token {
            config.session.csrf_token = Some(token.clone());
        }

        if let Some(user_agent) = &self.user_agent {
            config.session.user_agent = user_agent.clone();
        }

        if let Some(dir) = &self.output_directory {
            config.options.output_directory = Some(dir.clone());
        }

        if let Some(concurrency) = self.concurrency {
            config.options.concurrency = concurrency;
        }

        if let Some(retries) = self.retries {
            config.options.retries = retries;
        }

        if self.quiet {
            config.options.show_downloads = false;
        }
    }
}
