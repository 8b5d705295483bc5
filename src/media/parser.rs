//! Conversion from API media descriptors to canonical records.

use std::collections::HashMap;

use crate::api::types::RawApiMedia;
use crate::media::record::MediaRecord;

/// Build a canonical record from a resolver media descriptor.
///
/// The filename stays empty here; the normalizer fills it in once the final
/// ordering is known.
pub fn record_from_api(raw: &RawApiMedia) -> MediaRecord {
    let mut metadata = HashMap::new();
    if !raw.expanded_url.is_empty() {
        metadata.insert("expanded_url".to_string(), raw.expanded_url.clone());
    }
    if let Some((w, h)) = raw.aspect_ratio {
        metadata.insert("aspect_ratio".to_string(), format!("{}:{}", w, h));
    }
    if raw.animated {
        metadata.insert("animated".to_string(), "true".to_string());
    }
    metadata.insert("type_index".to_string(), raw.type_index.to_string());

    let post_url = if raw.author_handle.is_empty() {
        format!("https://x.com/i/status/{}", raw.post_id)
    } else {
        format!("https://x.com/{}/status/{}", raw.author_handle, raw.post_id)
    };

    MediaRecord {
        id: format!("{}_media_{}", raw.post_id, raw.index),
        url: raw.download_url.clone(),
        original_url: Some(raw.download_url.clone()),
        thumbnail_url: Some(raw.preview_url.clone()),
        media_type: raw.media_type,
        filename: String::new(),
        post_id: raw.post_id.clone(),
        author_handle: raw.author_handle.clone(),
        post_url,
        post_text: (!raw.post_text.is_empty()).then(|| raw.post_text.clone()),
        width: raw.width,
        height: raw.height,
        source_location: raw.source_location,
        index: raw.index,
        metadata,
    }
}
