//! Click target snapshot.

/// Snapshot of the interaction context handed to the locator.
///
/// The on-page layer captures whatever is cheap to read from the clicked
/// element and its ancestors; every field is optional and the locator
/// decides which ones to trust. The CLI host fills in only `anchor_href`.
#[derive(Debug, Clone, Default)]
pub struct ClickTarget {
    /// Post id read from a data attribute on the element itself.
    pub post_id_attr: Option<String>,

    /// Author handle read from a data attribute on the element itself.
    pub author_attr: Option<String>,

    /// `href` of the clicked anchor, if the target was (inside) a link.
    pub anchor_href: Option<String>,

    /// Permalink href of the nearest structural post container.
    pub container_permalink: Option<String>,

    /// Href of a media-grid ancestor anchor.
    pub grid_anchor_href: Option<String>,

    /// Resolved source of the clicked media element, in preference order.
    pub media_current_src: Option<String>,
    pub media_src: Option<String>,
    pub media_src_attr: Option<String>,
    pub media_poster: Option<String>,
}

impl ClickTarget {
    /// Target for a plain post URL, as typed on the command line.
    pub fn from_post_url(url: impl Into<String>) -> Self {
        Self {
            anchor_href: Some(url.into()),
            ..Default::default()
        }
    }

    /// Accept either a full post URL or a bare numeric post id.
    pub fn from_user_input(input: &str) -> Self {
        let input = input.trim();
        if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
            Self {
                post_id_attr: Some(input.to_string()),
                ..Default::default()
            }
        } else {
            Self::from_post_url(input)
        }
    }

    /// The clicked media element's URL: `currentSrc`, then `src`, then the
    /// raw attribute, then a video's `poster`.
    pub fn clicked_media_url(&self) -> Option<&str> {
        self.media_current_src
            .as_deref()
            .or(self.media_src.as_deref())
            .or(self.media_src_attr.as_deref())
            .or(self.media_poster.as_deref())
            .filter(|url| !url.is_empty())
    }
}
