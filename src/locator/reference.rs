//! Identified post reference.

use std::collections::HashMap;
use std::fmt;

/// Which locator strategy produced a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Post id/author read from element data attributes.
    DataAttribute,
    /// Clicked anchor's `/status/` href.
    AnchorHref,
    /// Permalink anchor on the structural post container.
    ContainerPermalink,
    /// Anchor on a media-grid ancestor.
    MediaGridAnchor,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtractionMethod::DataAttribute => "data-attribute",
            ExtractionMethod::AnchorHref => "anchor-href",
            ExtractionMethod::ContainerPermalink => "container-permalink",
            ExtractionMethod::MediaGridAnchor => "media-grid-anchor",
        };
        f.write_str(name)
    }
}

/// An identified post. Immutable once produced.
///
/// `confidence` is fixed per strategy and used only for diagnostics; no
/// control flow depends on it.
#[derive(Debug, Clone)]
pub struct PostReference {
    pub post_id: String,
    pub username: String,
    pub post_url: String,
    pub extraction_method: ExtractionMethod,
    pub confidence: f64,
    pub metadata: HashMap<String, String>,
}

impl PostReference {
    pub fn new(
        post_id: String,
        username: String,
        extraction_method: ExtractionMethod,
        confidence: f64,
    ) -> Self {
        let post_url = if username.is_empty() {
            format!("https://x.com/i/status/{}", post_id)
        } else {
            format!("https://x.com/{}/status/{}", username, post_id)
        };
        Self {
            post_id,
            username,
            post_url,
            extraction_method,
            confidence,
            metadata: HashMap::new(),
        }
    }
}

/// Structural validity check for a post id: non-empty, digits only.
pub fn is_valid_post_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_post_id() {
        assert!(is_valid_post_id("1234567890"));
        assert!(!is_valid_post_id(""));
        assert!(!is_valid_post_id("12a34"));
        assert!(!is_valid_post_id("unknown"));
    }

    #[test]
    fn test_post_url_with_username() {
        let reference = PostReference::new(
            "123".into(),
            "someone".into(),
            ExtractionMethod::AnchorHref,
            0.8,
        );
        assert_eq!(reference.post_url, "https://x.com/someone/status/123");
    }

    #[test]
    fn test_post_url_without_username() {
        let reference = PostReference::new(
            "123".into(),
            String::new(),
            ExtractionMethod::DataAttribute,
            0.9,
        );
        assert_eq!(reference.post_url, "https://x.com/i/status/123");
    }
}
