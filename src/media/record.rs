//! Canonical media record flowing through the pipeline.

use std::collections::HashMap;

/// Type of media content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Default file extension when the URL carries none.
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaType::Image => "jpg",
            MediaType::Video => "mp4",
        }
    }
}

/// Whether an item came from the clicked post itself or a post it quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLocation {
    Original,
    Quoted,
}

/// One downloadable image or video, correlated with its post and author.
///
/// After normalization, `index` is dense and zero-based in visual order,
/// `filename` is populated and sanitized, and `(original_url ?? url)` is
/// unique across the list.
#[derive(Debug, Clone)]
pub struct MediaRecord {
    /// Unique id within one extraction result.
    pub id: String,

    /// Download URL (highest-quality source).
    pub url: String,

    /// Canonical source URL used as the deduplication key.
    pub original_url: Option<String>,

    /// Preview/thumbnail URL.
    pub thumbnail_url: Option<String>,

    /// Image or video.
    pub media_type: MediaType,

    /// Generated download filename; empty until normalization.
    pub filename: String,

    /// Owning post id.
    pub post_id: String,

    /// Author handle of the owning post.
    pub author_handle: String,

    /// Permalink of the owning post.
    pub post_url: String,

    /// Post body text, if any.
    pub post_text: Option<String>,

    /// Pixel dimensions; resolved during normalization.
    pub width: Option<u32>,
    pub height: Option<u32>,

    /// Original post or quoted post.
    pub source_location: SourceLocation,

    /// Position within the extraction result.
    pub index: usize,

    /// Extra per-item data (permalink, aspect ratio hint, ...).
    pub metadata: HashMap<String, String>,
}

impl MediaRecord {
    /// The deduplication key: `original_url` when present, else `url`.
    pub fn dedup_key(&self) -> &str {
        self.original_url.as_deref().unwrap_or(&self.url)
    }

    /// Per-item permalink (the `/photo/N` page), when known.
    pub fn permalink(&self) -> Option<&str> {
        self.metadata.get("expanded_url").map(String::as_str)
    }
}

impl Default for MediaRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            url: String::new(),
            original_url: None,
            thumbnail_url: None,
            media_type: MediaType::Image,
            filename: String::new(),
            post_id: String::new(),
            author_handle: String::new(),
            post_url: String::new(),
            post_text: None,
            width: None,
            height: None,
            source_location: SourceLocation::Original,
            index: 0,
            metadata: HashMap::new(),
        }
    }
}
