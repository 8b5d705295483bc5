//! Filename generation and sanitization.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use crate::media::record::MediaRecord;

/// Maximum filename length in bytes.
const MAX_FILENAME_BYTES: usize = 255;

/// Last-resort filename when sanitization leaves nothing.
const FALLBACK_FILENAME: &str = "media";

fn media_id_ordinal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_media_(\d+)$").unwrap())
}

fn trailing_ordinal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_(\d+)$").unwrap())
}

/// Sanitize a filename: strip path-unsafe characters, cap at 255 bytes,
/// never return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim().trim_matches('.');
    if sanitized.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    truncate_to_bytes(sanitized, MAX_FILENAME_BYTES)
}

fn truncate_to_bytes(name: &str, limit: usize) -> String {
    if name.len() <= limit {
        return name.to_string();
    }
    let mut end = limit;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// Generate the download filename for a record.
///
/// `position` is the record's zero-based position after normalization, used
/// when the media id carries no ordinal of its own.
pub fn filename_for_record(record: &MediaRecord, position: usize) -> String {
    let extension = extension_from_url(&record.url)
        .unwrap_or_else(|| record.media_type.default_extension().to_string());
    let ordinal = ordinal_from_media_id(&record.id).unwrap_or(position as u64 + 1);

    let name = if !record.author_handle.is_empty() && !record.post_id.is_empty() {
        format!(
            "{}_{}_{}.{}",
            record.author_handle, record.post_id, ordinal, extension
        )
    } else if !record.post_id.is_empty() {
        format!("tweet_{}_{}.{}", record.post_id, ordinal, extension)
    } else {
        format!(
            "media_{}_{}.{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            ordinal,
            extension
        )
    };

    sanitize_filename(&name)
}

/// Ordinal embedded in a media id: `..._media_N` is zero-based (reported
/// 1-based), a bare trailing `_N` is taken as-is.
pub fn ordinal_from_media_id(media_id: &str) -> Option<u64> {
    if let Some(captures) = media_id_ordinal_regex().captures(media_id) {
        let zero_based: u64 = captures.get(1)?.as_str().parse().ok()?;
        return Some(zero_based + 1);
    }
    trailing_ordinal_regex()
        .captures(media_id)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Extension parsed from a URL path, validated as a known media type.
pub fn extension_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let filename = path.rsplit('/').next()?;
    let (_, extension) = filename.rsplit_once('.')?;

    if extension.is_empty()
        || extension.len() > 4
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }

    let extension = extension.to_lowercase();
    let mime = mime_guess::from_ext(&extension).first()?;
    matches!(mime.type_().as_str(), "image" | "video").then_some(extension)
}

/// Archive name for a set of records: `{author}_{postId}.zip`, with a
/// timestamp fallback when the metadata is unavailable.
pub fn archive_filename(records: &[MediaRecord]) -> String {
    if let Some(first) = records.first() {
        if !first.author_handle.is_empty() && !first.post_id.is_empty() {
            return sanitize_filename(&format!("{}_{}.zip", first.author_handle, first.post_id));
        }
        if !first.post_id.is_empty() {
            return sanitize_filename(&format!("tweet_{}.zip", first.post_id));
        }
    }
    sanitize_filename(&format!("media_{}.zip", Utc::now().format("%Y%m%d%H%M%S")))
}

/// Resolve a filename collision by appending `-1`, `-2`, ... before the
/// extension until the name is unused.
pub fn resolve_collision(name: &str, used: &HashSet<String>) -> String {
    if !used.contains(name) {
        return name.to_string();
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    let mut counter = 1;
    loop {
        let candidate = match extension {
            Some(ext) => format!("{}-{}.{}", stem, counter, ext),
            None => format!("{}-{}", stem, counter),
        };
        if !used.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
