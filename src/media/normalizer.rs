//! Media list normalization: dedup, visual ordering, dimensions,
//! filenames, clicked-item correlation.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::locator::target::ClickTarget;
use crate::media::filename::filename_for_record;
use crate::media::record::{MediaRecord, SourceLocation};

/// Reference height a bare aspect-ratio hint is scaled to.
const REFERENCE_HEIGHT: u32 = 720;

/// Dimensions used when nothing better is known.
const FALLBACK_WIDTH: u32 = 540;
const FALLBACK_HEIGHT: u32 = 720;

fn visual_position_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/(?:photo|video)/(\d+)(?:[?#].*)?$").unwrap())
}

fn url_dimensions_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/(\d{2,6})x(\d{2,6})(?:/|\.|$)").unwrap())
}

/// Run the full normalization pass: deduplicate, order by visual position,
/// renumber densely, resolve dimensions and generate filenames.
pub fn normalize(records: Vec<MediaRecord>) -> Vec<MediaRecord> {
    let mut records = sort_by_visual_order(dedup(records));

    for (position, record) in records.iter_mut().enumerate() {
        record.index = position;
        resolve_dimensions(record);
        if record.filename.is_empty() {
            record.filename = filename_for_record(record, position);
        } else {
            record.filename = crate::media::filename::sanitize_filename(&record.filename);
        }
    }

    records
}

/// Stable deduplication keyed by `original_url ?? url`; the first
/// occurrence wins.
pub fn dedup(records: Vec<MediaRecord>) -> Vec<MediaRecord> {
    let mut seen = HashSet::new();
    let before = records.len();
    let records: Vec<MediaRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.dedup_key().to_string()))
        .collect();

    if records.len() < before {
        tracing::debug!(
            removed = before - records.len(),
            unique = records.len(),
            "removed duplicate media items"
        );
    }
    records
}

/// Order records by the numeric suffix of their per-item permalink
/// (`/photo/N`, `/video/N`), within each source group so quoted media keep
/// precedence over the primary post's media. Items without a parseable
/// suffix sort to position 0.
pub fn sort_by_visual_order(records: Vec<MediaRecord>) -> Vec<MediaRecord> {
    if records.len() <= 1 {
        return records;
    }

    let (mut quoted, mut original): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|r| r.source_location == SourceLocation::Quoted);

    quoted.sort_by_key(|r| visual_position(r.permalink().unwrap_or_default()));
    original.sort_by_key(|r| visual_position(r.permalink().unwrap_or_default()));

    quoted.extend(original);
    quoted
}

/// Zero-based visual position parsed from a permalink path; 0 when absent.
pub fn visual_position(url: &str) -> usize {
    visual_position_regex()
        .captures(url)
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map(|n| n - 1)
        .unwrap_or(0)
}

/// Fill in `width`/`height`, first match wins:
/// explicit dims → `{w}x{h}` URL segment → aspect-ratio hint scaled to the
/// reference height → hard-coded fallback.
fn resolve_dimensions(record: &mut MediaRecord) {
    if record.width.is_some() && record.height.is_some() {
        return;
    }

    let from_url = record
        .thumbnail_url
        .as_deref()
        .and_then(dimensions_from_url)
        .or_else(|| dimensions_from_url(&record.url));
    if let Some((width, height)) = from_url {
        record.width = Some(width);
        record.height = Some(height);
        return;
    }

    if let Some((ratio_w, ratio_h)) = aspect_ratio_hint(record) {
        let width =
            ((ratio_w as f64 / ratio_h as f64) * REFERENCE_HEIGHT as f64).round() as u32;
        record.width = Some(width.max(1));
        record.height = Some(REFERENCE_HEIGHT);
        return;
    }

    record.width = Some(FALLBACK_WIDTH);
    record.height = Some(FALLBACK_HEIGHT);
}

/// Parse a `/{width}x{height}/` path segment.
pub fn dimensions_from_url(url: &str) -> Option<(u32, u32)> {
    let captures = url_dimensions_regex().captures(url)?;
    let width: u32 = captures.get(1)?.as_str().parse().ok()?;
    let height: u32 = captures.get(2)?.as_str().parse().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

fn aspect_ratio_hint(record: &MediaRecord) -> Option<(u32, u32)> {
    let hint = record.metadata.get("aspect_ratio")?;
    let (w, h) = hint.split_once(':')?;
    let w: u32 = w.parse().ok()?;
    let h: u32 = h.parse().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

/// Find the record matching the clicked media element.
///
/// The clicked URL is compared by normalized filename (URL path basename,
/// extension stripped); an unresolved click falls back to index 0. That
/// fallback is lossy by design, not an error.
pub fn correlate_clicked(records: &[MediaRecord], target: &ClickTarget) -> usize {
    let Some(clicked_url) = target.clicked_media_url() else {
        return 0;
    };
    let Some(clicked_name) = normalized_basename(clicked_url) else {
        return 0;
    };

    records
        .iter()
        .position(|record| {
            [
                Some(record.url.as_str()),
                record.original_url.as_deref(),
                record.thumbnail_url.as_deref(),
            ]
            .into_iter()
            .flatten()
            .filter_map(normalized_basename)
            .any(|name| name == clicked_name)
        })
        .unwrap_or(0)
}

/// URL path basename with query and extension stripped.
fn normalized_basename(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let basename = path.rsplit('/').next()?;
    if basename.is_empty() {
        return None;
    }
    let stem = basename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(basename);
    (!stem.is_empty()).then(|| stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::record::MediaType;

    fn record(url: &str, permalink: &str) -> MediaRecord {
        let mut record = MediaRecord {
            url: url.to_string(),
            original_url: Some(url.to_string()),
            post_id: "100".into(),
            author_handle: "author".into(),
            media_type: MediaType::Image,
            ..Default::default()
        };
        if !permalink.is_empty() {
            record
                .metadata
                .insert("expanded_url".to_string(), permalink.to_string());
        }
        record
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let mut a = record("https://h/a.jpg", "");
        a.id = "first".into();
        let mut a2 = record("https://h/a.jpg", "");
        a2.id = "second".into();
        let b = record("https://h/b.jpg", "");

        let out = dedup(vec![a, a2, b]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "first");
        assert_eq!(out[1].url, "https://h/b.jpg");
    }

    #[test]
    fn test_dedup_idempotent() {
        let records = vec![
            record("https://h/a.jpg", ""),
            record("https://h/a.jpg", ""),
            record("https://h/b.jpg", ""),
        ];
        let once = dedup(records);
        let keys: Vec<String> = once.iter().map(|r| r.dedup_key().to_string()).collect();
        let twice = dedup(once);
        assert_eq!(
            keys,
            twice
                .iter()
                .map(|r| r.dedup_key().to_string())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_dedup_key_uses_original_url() {
        let mut a = record("https://h/small.jpg", "");
        a.original_url = Some("https://h/orig.jpg".into());
        let mut b = record("https://h/large.jpg", "");
        b.original_url = Some("https://h/orig.jpg".into());

        assert_eq!(dedup(vec![a, b]).len(), 1);
    }

    #[test]
    fn test_visual_ordering() {
        let records = vec![
            record("https://h/c.jpg", "https://x.com/a/status/1/photo/3"),
            record("https://h/a.jpg", "https://x.com/a/status/1/photo/1"),
            record("https://h/b.jpg", "https://x.com/a/status/1/photo/2"),
        ];
        let out = normalize(records);
        assert_eq!(out[0].url, "https://h/a.jpg");
        assert_eq!(out[1].url, "https://h/b.jpg");
        assert_eq!(out[2].url, "https://h/c.jpg");
        let indices: Vec<usize> = out.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_index_density_regardless_of_input() {
        let mut records = vec![
            record("https://h/a.jpg", "https://x.com/a/status/1/photo/2"),
            record("https://h/b.jpg", ""),
            record("https://h/a.jpg", "https://x.com/a/status/1/photo/2"),
            record("https://h/c.jpg", "https://x.com/a/status/1/video/1"),
        ];
        records[1].index = 7;
        records[3].index = 3;

        let out = normalize(records);
        let indices: Vec<usize> = out.iter().map(|r| r.index).collect();
        assert_eq!(indices, (0..out.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_quoted_precedes_original() {
        let mut q = record("https://h/q.jpg", "https://x.com/q/status/2/photo/1");
        q.source_location = SourceLocation::Quoted;
        let records = vec![
            record("https://h/a.jpg", "https://x.com/a/status/1/photo/1"),
            record("https://h/b.jpg", "https://x.com/a/status/1/photo/2"),
            q,
        ];

        let out = normalize(records);
        assert_eq!(out[0].source_location, SourceLocation::Quoted);
        assert_eq!(out[0].index, 0);
        assert_eq!(out[1].url, "https://h/a.jpg");
        assert_eq!(out[2].url, "https://h/b.jpg");
    }

    #[test]
    fn test_visual_position_parsing() {
        assert_eq!(visual_position("https://x.com/a/status/1/photo/3"), 2);
        assert_eq!(visual_position("https://x.com/a/status/1/video/1"), 0);
        assert_eq!(visual_position("https://x.com/a/status/1/photo/2?s=20"), 1);
        assert_eq!(visual_position("https://x.com/a/status/1"), 0);
        assert_eq!(visual_position(""), 0);
    }

    #[test]
    fn test_dimensions_explicit_preserved() {
        let mut r = record("https://h/a.jpg", "");
        r.width = Some(100);
        r.height = Some(200);
        let out = normalize(vec![r]);
        assert_eq!((out[0].width, out[0].height), (Some(100), Some(200)));
    }

    #[test]
    fn test_dimensions_from_url_segment() {
        let mut r = record("https://h/a.jpg", "");
        r.thumbnail_url = Some("https://h/thumb/640x480/a.jpg".into());
        let out = normalize(vec![r]);
        assert_eq!((out[0].width, out[0].height), (Some(640), Some(480)));
    }

    #[test]
    fn test_dimensions_from_aspect_ratio() {
        let mut r = record("https://h/a", "");
        r.metadata
            .insert("aspect_ratio".to_string(), "16:9".to_string());
        let out = normalize(vec![r]);
        assert_eq!((out[0].width, out[0].height), (Some(1280), Some(720)));
    }

    #[test]
    fn test_dimensions_fallback() {
        let out = normalize(vec![record("https://h/a", "")]);
        assert_eq!((out[0].width, out[0].height), (Some(540), Some(720)));
    }

    #[test]
    fn test_dimensions_from_url_pattern() {
        assert_eq!(
            dimensions_from_url("https://h/640x480/a.jpg"),
            Some((640, 480))
        );
        assert_eq!(dimensions_from_url("https://h/1920x1080.jpg"), Some((1920, 1080)));
        assert_eq!(dimensions_from_url("https://h/a.jpg"), None);
        // Single digits never match; too easy to collide with real names.
        assert_eq!(dimensions_from_url("https://h/1x2/a.jpg"), None);
    }

    #[test]
    fn test_filenames_generated() {
        let out = normalize(vec![
            record("https://h/a.jpg", "https://x.com/a/status/1/photo/1"),
            record("https://h/b.jpg", "https://x.com/a/status/1/photo/2"),
        ]);
        assert_eq!(out[0].filename, "author_100_1.jpg");
        assert_eq!(out[1].filename, "author_100_2.jpg");
    }

    #[test]
    fn test_explicit_filename_sanitized_not_replaced() {
        let mut r = record("https://h/a.jpg", "");
        r.filename = "keep:me.jpg".to_string();
        let out = normalize(vec![r]);
        assert_eq!(out[0].filename, "keep_me.jpg");
    }

    #[test]
    fn test_correlate_clicked_matches_basename() {
        let records = vec![
            record("https://h/media/first.jpg", ""),
            record("https://h/media/second.jpg", ""),
        ];
        let target = ClickTarget {
            media_current_src: Some("https://cdn/second.jpg?name=small".into()),
            ..Default::default()
        };
        assert_eq!(correlate_clicked(&records, &target), 1);
    }

    #[test]
    fn test_correlate_clicked_poster_fallback() {
        let mut records = vec![record("https://h/clip.mp4", "")];
        records[0].thumbnail_url = Some("https://h/thumbs/preview.jpg".into());
        let target = ClickTarget {
            media_poster: Some("https://h/thumbs/preview.jpg".into()),
            ..Default::default()
        };
        assert_eq!(correlate_clicked(&records, &target), 0);
    }

    #[test]
    fn test_correlate_clicked_defaults_to_zero() {
        let records = vec![
            record("https://h/a.jpg", ""),
            record("https://h/b.jpg", ""),
        ];
        let miss = ClickTarget {
            media_src: Some("https://elsewhere/unknown.jpg".into()),
            ..Default::default()
        };
        assert_eq!(correlate_clicked(&records, &miss), 0);
        assert_eq!(correlate_clicked(&records, &ClickTarget::default()), 0);
    }
}
