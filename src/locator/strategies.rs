//! Locator strategies: ordered fallbacks from click target to post
//! reference.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::locator::reference::{is_valid_post_id, ExtractionMethod, PostReference};
use crate::locator::target::ClickTarget;

/// Path segments that can never be a username in a status URL.
const RESERVED_PATH_SEGMENTS: &[&str] = &[
    "home",
    "explore",
    "search",
    "notifications",
    "messages",
    "bookmarks",
    "lists",
    "compose",
    "settings",
    "login",
    "logout",
    "signup",
    "i",
];

fn status_regex() -> &'static Regex {
    static STATUS_RE: OnceLock<Regex> = OnceLock::new();
    STATUS_RE.get_or_init(|| Regex::new(r"/status/(\d+)").unwrap())
}

fn username_regex() -> &'static Regex {
    static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
    USERNAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{1,15}$").unwrap())
}

/// Identify the post a click target belongs to.
///
/// Applies strategies in order and returns the first structurally valid
/// result (numeric post id). Returns `None` when nothing matched; a miss
/// is "nothing to do", not an error.
pub fn locate_post(target: &ClickTarget) -> Option<PostReference> {
    let strategies: [fn(&ClickTarget) -> Option<PostReference>; 4] = [
        from_data_attributes,
        from_anchor_href,
        from_container_permalink,
        from_grid_anchor,
    ];

    for strategy in strategies {
        if let Some(reference) = strategy(target) {
            tracing::debug!(
                post_id = %reference.post_id,
                method = %reference.extraction_method,
                confidence = reference.confidence,
                "located post"
            );
            return Some(reference);
        }
    }

    tracing::debug!("no locator strategy matched");
    None
}

/// Strategy 1: id/author straight from element data attributes.
fn from_data_attributes(target: &ClickTarget) -> Option<PostReference> {
    let post_id = target.post_id_attr.as_deref()?;
    if !is_valid_post_id(post_id) {
        return None;
    }
    let username = target.author_attr.clone().unwrap_or_default();
    Some(PostReference::new(
        post_id.to_string(),
        username,
        ExtractionMethod::DataAttribute,
        0.9,
    ))
}

/// Strategy 2: the clicked anchor's `/status/` href.
fn from_anchor_href(target: &ClickTarget) -> Option<PostReference> {
    let href = target.anchor_href.as_deref()?;
    let (username, post_id) = parse_status_href(href)?;
    Some(PostReference::new(
        post_id,
        username,
        ExtractionMethod::AnchorHref,
        0.8,
    ))
}

/// Strategy 3: permalink anchor of the nearest post container.
fn from_container_permalink(target: &ClickTarget) -> Option<PostReference> {
    let href = target.container_permalink.as_deref()?;
    let (username, post_id) = parse_status_href(href)?;
    Some(PostReference::new(
        post_id,
        username,
        ExtractionMethod::ContainerPermalink,
        0.85,
    ))
}

/// Strategy 4: anchor on a media-grid ancestor.
fn from_grid_anchor(target: &ClickTarget) -> Option<PostReference> {
    let href = target.grid_anchor_href.as_deref()?;
    let (username, post_id) = parse_status_href(href)?;
    Some(PostReference::new(
        post_id,
        username,
        ExtractionMethod::MediaGridAnchor,
        0.8,
    ))
}

/// Pull `(username, post_id)` out of a `/{username}/status/{id}` href.
///
/// Accepts absolute and site-relative hrefs. The username is the path
/// segment preceding `status`; reserved segments and malformed handles are
/// rejected.
fn parse_status_href(href: &str) -> Option<(String, String)> {
    let captures = status_regex().captures(href)?;
    let post_id = captures.get(1)?.as_str().to_string();

    let url = if href.starts_with("http://") || href.starts_with("https://") {
        Url::parse(href).ok()?
    } else {
        Url::parse("https://x.com").ok()?.join(href).ok()?
    };

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let status_at = segments.iter().position(|s| *s == "status")?;
    if status_at == 0 {
        return None;
    }

    let username = segments[status_at - 1];
    if RESERVED_PATH_SEGMENTS.contains(&username) || !username_regex().is_match(username) {
        return None;
    }

    Some((username.to_string(), post_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_attribute_strategy() {
        let target = ClickTarget {
            post_id_attr: Some("1234567890".into()),
            author_attr: Some("someone".into()),
            ..Default::default()
        };
        let reference = locate_post(&target).unwrap();
        assert_eq!(reference.post_id, "1234567890");
        assert_eq!(reference.username, "someone");
        assert_eq!(reference.extraction_method, ExtractionMethod::DataAttribute);
        assert_eq!(reference.confidence, 0.9);
    }

    #[test]
    fn test_data_attribute_rejects_non_numeric_id() {
        let target = ClickTarget {
            post_id_attr: Some("not-a-post".into()),
            ..Default::default()
        };
        assert!(locate_post(&target).is_none());
    }

    #[test]
    fn test_anchor_href_strategy() {
        let target =
            ClickTarget::from_post_url("https://x.com/someone/status/1234567890/photo/2");
        let reference = locate_post(&target).unwrap();
        assert_eq!(reference.post_id, "1234567890");
        assert_eq!(reference.username, "someone");
        assert_eq!(reference.extraction_method, ExtractionMethod::AnchorHref);
        assert_eq!(reference.confidence, 0.8);
        assert_eq!(reference.post_url, "https://x.com/someone/status/1234567890");
    }

    #[test]
    fn test_anchor_href_relative() {
        let target = ClickTarget::from_post_url("/someone/status/42");
        let reference = locate_post(&target).unwrap();
        assert_eq!(reference.post_id, "42");
        assert_eq!(reference.username, "someone");
    }

    #[test]
    fn test_anchor_href_rejects_reserved_segments() {
        for reserved in ["home", "explore", "search", "i"] {
            let target =
                ClickTarget::from_post_url(format!("https://x.com/{}/status/123", reserved));
            assert!(locate_post(&target).is_none(), "{} should be rejected", reserved);
        }
    }

    #[test]
    fn test_container_permalink_strategy() {
        let target = ClickTarget {
            container_permalink: Some("https://x.com/author/status/555".into()),
            ..Default::default()
        };
        let reference = locate_post(&target).unwrap();
        assert_eq!(
            reference.extraction_method,
            ExtractionMethod::ContainerPermalink
        );
        assert_eq!(reference.confidence, 0.85);
    }

    #[test]
    fn test_grid_anchor_strategy() {
        let target = ClickTarget {
            grid_anchor_href: Some("/gallery_user/status/987/video/1".into()),
            ..Default::default()
        };
        let reference = locate_post(&target).unwrap();
        assert_eq!(
            reference.extraction_method,
            ExtractionMethod::MediaGridAnchor
        );
        assert_eq!(reference.username, "gallery_user");
    }

    #[test]
    fn test_strategy_order() {
        // Data attributes win over an anchor that would also match.
        let target = ClickTarget {
            post_id_attr: Some("111".into()),
            author_attr: Some("attr_author".into()),
            anchor_href: Some("https://x.com/other/status/222".into()),
            ..Default::default()
        };
        let reference = locate_post(&target).unwrap();
        assert_eq!(reference.post_id, "111");

        // An invalid data attribute falls through to the anchor.
        let target = ClickTarget {
            post_id_attr: Some("abc".into()),
            anchor_href: Some("https://x.com/other/status/222".into()),
            ..Default::default()
        };
        let reference = locate_post(&target).unwrap();
        assert_eq!(reference.post_id, "222");
    }

    #[test]
    fn test_no_strategy_matches() {
        assert!(locate_post(&ClickTarget::default()).is_none());
        let target = ClickTarget::from_post_url("https://example.com/not/a/post");
        assert!(locate_post(&target).is_none());
    }

    #[test]
    fn test_parse_status_href_rejects_overlong_username() {
        assert!(parse_status_href("https://x.com/way_too_long_username_here/status/1").is_none());
    }
}
