//! GraphQL response type definitions.
//!
//! Field names mirror the remote contract; almost everything is optional
//! because the API ships at least two legacy shapes (`tweet` nesting and
//! `legacy`-wrapped fields) that the client hoists before extraction.

use serde::Deserialize;

use crate::media::record::{MediaType, SourceLocation};

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub tweet_result: Option<TweetResultEnvelope>,
}

#[derive(Debug, Deserialize)]
pub struct TweetResultEnvelope {
    pub result: Option<TweetResult>,
}

/// A tweet result, possibly wrapped one level deeper under `tweet`.
#[derive(Debug, Deserialize, Default)]
pub struct TweetResult {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,

    /// Some response shapes nest the actual content one level deeper.
    pub tweet: Option<Box<TweetResult>>,

    pub rest_id: Option<String>,
    pub id_str: Option<String>,
    pub full_text: Option<String>,

    pub legacy: Option<LegacyTweet>,
    pub core: Option<TweetCore>,
    pub extended_entities: Option<ExtendedEntities>,
    pub note_tweet: Option<NoteTweet>,
    pub quoted_status_result: Option<Box<TweetResultEnvelope>>,
}

/// Legacy wrapper carrying text/media/id for older response shapes.
#[derive(Debug, Deserialize, Default)]
pub struct LegacyTweet {
    pub id_str: Option<String>,
    pub full_text: Option<String>,
    pub extended_entities: Option<ExtendedEntities>,
}

#[derive(Debug, Deserialize)]
pub struct TweetCore {
    pub user_results: Option<UserResults>,
}

#[derive(Debug, Deserialize)]
pub struct UserResults {
    pub result: Option<ApiUser>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiUser {
    pub screen_name: Option<String>,
    pub name: Option<String>,
    pub legacy: Option<LegacyUser>,
}

#[derive(Debug, Deserialize)]
pub struct LegacyUser {
    pub screen_name: Option<String>,
    pub name: Option<String>,
}

/// Long-form post text container; preferred over `full_text` when present.
#[derive(Debug, Deserialize)]
pub struct NoteTweet {
    pub note_tweet_results: Option<NoteTweetResults>,
}

#[derive(Debug, Deserialize)]
pub struct NoteTweetResults {
    pub result: Option<NoteTweetResult>,
}

#[derive(Debug, Deserialize)]
pub struct NoteTweetResult {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ExtendedEntities {
    #[serde(default)]
    pub media: Vec<ApiMedia>,
}

/// One media attachment as the API describes it.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiMedia {
    /// "photo", "video" or "animated_gif".
    #[serde(rename = "type")]
    pub media_type: String,

    pub id_str: Option<String>,
    pub media_key: Option<String>,

    /// Thumbnail / direct photo URL.
    pub media_url_https: Option<String>,

    /// Shortened placeholder as it appears in the post text.
    pub url: Option<String>,
    pub display_url: Option<String>,

    /// Per-item permalink carrying the visual position (`/photo/N`).
    pub expanded_url: Option<String>,

    pub original_info: Option<OriginalInfo>,
    pub video_info: Option<VideoInfo>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OriginalInfo {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct VideoInfo {
    #[serde(default)]
    pub aspect_ratio: Vec<u32>,
    #[serde(default)]
    pub variants: Vec<VideoVariant>,
}

/// One encoding of a video; only MP4 variants are downloadable.
#[derive(Debug, Deserialize, Clone)]
pub struct VideoVariant {
    pub bitrate: Option<u64>,
    pub content_type: String,
    pub url: String,
}

/// Guest token activation response.
#[derive(Debug, Deserialize)]
pub struct GuestTokenResponse {
    pub guest_token: Option<String>,
}

/// Normalized media descriptor produced by the resolver.
///
/// Transient: converted into `MediaRecord` by the normalizer and never
/// exposed beyond that boundary.
#[derive(Debug, Clone)]
pub struct RawApiMedia {
    pub media_id: String,
    pub post_id: String,
    pub author_handle: String,
    pub media_type: MediaType,
    /// True for animated GIFs, which download as MP4 video.
    pub animated: bool,
    /// Highest-quality download URL.
    pub download_url: String,
    /// Thumbnail URL.
    pub preview_url: String,
    /// Per-item permalink (`.../photo/N`).
    pub expanded_url: String,
    pub post_text: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub aspect_ratio: Option<(u32, u32)>,
    pub source_location: SourceLocation,
    /// Position within the combined (quoted + original) result.
    pub index: usize,
    /// Ordinal among items of the same type within one post.
    pub type_index: usize,
}
