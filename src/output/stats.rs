//! Download result summaries.

use console::style;

use crate::download::bulk::{BulkResult, BulkStatus};
use crate::media::record::{MediaRecord, MediaType, SourceLocation};

/// Print the media found in a post before downloading.
pub fn print_media_listing(records: &[MediaRecord]) {
    println!();
    println!("{}", style("Media found:").bold());
    for record in records {
        let kind = match record.media_type {
            MediaType::Image => "image",
            MediaType::Video => "video",
        };
        let origin = match record.source_location {
            SourceLocation::Original => "",
            SourceLocation::Quoted => " (quoted)",
        };
        println!("  [{}] {}{} - {}", record.index, kind, origin, record.filename);
    }
    println!();
}

/// Print the outcome of a bulk download.
pub fn print_bulk_summary(result: &BulkResult) {
    println!();
    match result.status {
        BulkStatus::AllSucceeded => {
            println!(
                "{} {} files archived as {}",
                style("OK").green().bold(),
                result.files_successful,
                result.archive_filename.as_deref().unwrap_or("?")
            );
        }
        BulkStatus::Partial => {
            println!(
                "{} {}/{} files archived as {} ({} failed)",
                style("WARN").yellow().bold(),
                result.files_successful,
                result.files_processed,
                result.archive_filename.as_deref().unwrap_or("?"),
                result.failures.len()
            );
            for failure in &result.failures {
                println!("    {} {}", style("failed:").red(), failure.url);
            }
        }
        BulkStatus::AllFailed => {
            println!(
                "{} all {} downloads failed",
                style("ERROR").red().bold(),
                result.files_processed
            );
        }
        BulkStatus::Cancelled => {
            println!("{} download cancelled", style("INFO").cyan().bold());
        }
    }
}
