//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bars
//! - Download result summaries

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{print_banner, print_debug, print_error, print_info, print_success, print_warning};
pub use progress::{create_item_bar, create_spinner};
pub use stats::{print_bulk_summary, print_media_listing};
