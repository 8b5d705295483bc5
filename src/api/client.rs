//! GraphQL API client: fetches a post's media graph and normalizes it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;
use url::Url;

use crate::api::auth::SessionAuth;
use crate::api::cache::ResolverCache;
use crate::api::types::*;
use crate::error::{Error, Result};
use crate::host::store::KeyValueStore;
use crate::host::transport::{HttpRequest, HttpTransport};
use crate::media::record::{MediaType, SourceLocation};

/// GraphQL API base URL.
const API_BASE: &str = "https://x.com/i/api/graphql";

/// Operation id of the `TweetResultByRestId` query. Fixed by the remote
/// contract.
const TWEET_RESULT_QUERY_ID: &str = "zAz9764BcLZOJ0JU2wrd1A";

/// API client with authentication and a per-instance response cache.
///
/// Lookups are cached by the fully-built query URL (LRU, 16 entries); a
/// cache hit skips the network call entirely. Lookup failures surface as
/// errors to the caller and are never retried here — download retry lives
/// in the orchestrator.
pub struct TwitterApi {
    transport: Arc<dyn HttpTransport>,
    auth: SessionAuth,
    cache: Mutex<ResolverCache>,
}

impl TwitterApi {
    /// Create a client over the host transport and token store.
    pub fn new(transport: Arc<dyn HttpTransport>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            transport,
            auth: SessionAuth::new(store),
            cache: Mutex::new(ResolverCache::new()),
        }
    }

    /// Fetch the full media graph of a post.
    ///
    /// Returns the post's media in order, with any quoted post's media
    /// prepended (tagged [`SourceLocation::Quoted`]) and indices renumbered
    /// so quoted items occupy the lowest positions. An empty vec means the
    /// post exists but carries no usable media.
    pub async fn post_media(&self, post_id: &str) -> Result<Vec<RawApiMedia>> {
        let url = self.endpoint_url(post_id);
        let body = self.api_request(&url).await?;

        let parsed: GraphQlResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("Failed to parse media graph: {}", e)))?;

        let result = parsed
            .data
            .and_then(|d| d.tweet_result)
            .and_then(|envelope| envelope.result)
            .ok_or_else(|| Error::PostNotFound(post_id.to_string()))?;

        let mut result = unwrap_nested(result);
        hoist_tweet_fields(&mut result);
        let user = take_user(&mut result);

        let mut items = media_entries(&result, &user, SourceLocation::Original);

        if let Some(quoted) = result
            .quoted_status_result
            .take()
            .and_then(|envelope| envelope.result)
        {
            let mut quoted = unwrap_nested(quoted);
            hoist_tweet_fields(&mut quoted);
            let quoted_user = take_user(&mut quoted);

            let mut quoted_items = media_entries(&quoted, &quoted_user, SourceLocation::Quoted);
            if !quoted_items.is_empty() {
                // Quoted media occupy the lowest indices; kept for output
                // compatibility.
                let offset = quoted_items.len();
                for item in &mut items {
                    item.index += offset;
                }
                quoted_items.append(&mut items);
                items = quoted_items;
            }
        }

        tracing::debug!(post_id, count = items.len(), "resolved media graph");
        Ok(items)
    }

    /// Expose the CSRF refresh hook so the host can push new cookie values.
    pub fn refresh_csrf_token(&self, value: String) {
        self.auth.refresh_csrf_token(value);
    }

    /// Execute a GET against the GraphQL endpoint, going through the
    /// response cache.
    async fn api_request(&self, url: &str) -> Result<String> {
        if let Some(body) = self.cache.lock().unwrap().get(url) {
            tracing::debug!("resolver cache hit");
            return Ok(body);
        }

        self.auth
            .activate_guest_token_if_needed(self.transport.as_ref())
            .await;

        let mut request = HttpRequest::get(url);
        for (name, value) in self.auth.request_headers().await {
            request = request.header(name, value);
        }

        tracing::debug!("GET {}", url);
        let response = self.transport.request(request).await?;

        if response.status == 401 || response.status == 403 {
            return Err(Error::Authentication(format!(
                "HTTP {} from media graph endpoint",
                response.status
            )));
        }
        if !response.is_success() {
            return Err(Error::Api(format!(
                "HTTP {} from media graph endpoint",
                response.status
            )));
        }

        let body = response.text();
        if body.trim().is_empty() {
            return Err(Error::Api("Empty media graph response".into()));
        }

        self.cache
            .lock()
            .unwrap()
            .insert(url.to_string(), body.clone());
        Ok(body)
    }

    /// Build the query URL with the three opaque parameter blobs the
    /// endpoint requires.
    fn endpoint_url(&self, post_id: &str) -> String {
        let variables = json!({
            "tweetId": post_id,
            "withCommunity": false,
            "includePromotedContent": false,
            "withVoice": false,
        });
        let features = json!({
            "creator_subscriptions_tweet_preview_api_enabled": true,
            "premium_content_api_read_enabled": false,
            "communities_web_enable_tweet_community_results_fetch": true,
            "c9s_tweet_anatomy_moderator_badge_enabled": true,
            "responsive_web_grok_analyze_button_fetch_trends_enabled": false,
            "responsive_web_grok_analyze_post_followups_enabled": false,
            "responsive_web_jetfuel_frame": false,
            "responsive_web_grok_share_attachment_enabled": true,
            "articles_preview_enabled": true,
            "responsive_web_edit_tweet_api_enabled": true,
            "graphql_is_translatable_rweb_tweet_is_translatable_enabled": true,
            "view_counts_everywhere_api_enabled": true,
            "longform_notetweets_consumption_enabled": true,
            "responsive_web_twitter_article_tweet_consumption_enabled": true,
            "tweet_awards_web_tipping_enabled": false,
            "responsive_web_grok_show_grok_translated_post": false,
            "responsive_web_grok_analysis_button_from_backend": false,
            "creator_subscriptions_quote_tweet_preview_enabled": false,
            "freedom_of_speech_not_reach_fetch_enabled": true,
            "standardized_nudges_misinfo": true,
            "tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled": true,
            "longform_notetweets_rich_text_read_enabled": true,
            "longform_notetweets_inline_media_enabled": true,
            "profile_label_improvements_pcf_label_in_post_enabled": true,
            "rweb_tipjar_consumption_enabled": true,
            "verified_phone_label_enabled": false,
            "responsive_web_grok_image_annotation_enabled": true,
            "responsive_web_graphql_skip_user_profile_image_extensions_enabled": false,
            "responsive_web_graphql_timeline_navigation_enabled": true,
            "responsive_web_enhance_cards_enabled": false,
        });
        let field_toggles = json!({
            "withArticleRichContentState": true,
            "withArticlePlainText": false,
            "withGrokAnalyze": false,
            "withDisallowedReplyControls": false,
        });

        let mut url = Url::parse(&format!(
            "{}/{}/TweetResultByRestId",
            API_BASE, TWEET_RESULT_QUERY_ID
        ))
        .unwrap();
        url.query_pairs_mut()
            .append_pair("variables", &variables.to_string())
            .append_pair("features", &features.to_string())
            .append_pair("fieldToggles", &field_toggles.to_string());
        url.into()
    }
}

/// Unwrap the shape that nests the actual content one level deeper under
/// `tweet`.
fn unwrap_nested(mut result: TweetResult) -> TweetResult {
    match result.tweet.take() {
        Some(inner) => *inner,
        None => result,
    }
}

/// Hoist legacy-wrapped fields in place and prefer long-form note text.
fn hoist_tweet_fields(result: &mut TweetResult) {
    if let Some(legacy) = result.legacy.take() {
        if result.extended_entities.is_none() {
            result.extended_entities = legacy.extended_entities;
        }
        if result.full_text.is_none() {
            result.full_text = legacy.full_text;
        }
        if result.id_str.is_none() {
            result.id_str = legacy.id_str;
        }
    }

    let note_text = result
        .note_tweet
        .as_ref()
        .and_then(|n| n.note_tweet_results.as_ref())
        .and_then(|r| r.result.as_ref())
        .and_then(|r| r.text.clone());
    if let Some(text) = note_text {
        result.full_text = Some(text);
    }
}

/// Take the author out of the result, hoisting legacy user fields.
fn take_user(result: &mut TweetResult) -> ApiUser {
    let mut user = result
        .core
        .take()
        .and_then(|core| core.user_results)
        .and_then(|results| results.result)
        .unwrap_or_default();

    if let Some(legacy) = user.legacy.take() {
        if user.screen_name.is_none() {
            user.screen_name = legacy.screen_name;
        }
        if user.name.is_none() {
            user.name = legacy.name;
        }
    }
    user
}

/// Extract the usable media of one tweet, choosing the highest-quality
/// source per item. Items without a usable URL are skipped, not failed.
fn media_entries(
    result: &TweetResult,
    user: &ApiUser,
    source_location: SourceLocation,
) -> Vec<RawApiMedia> {
    let Some(entities) = &result.extended_entities else {
        return Vec::new();
    };

    let author = user.screen_name.clone().unwrap_or_default();
    let post_id = result
        .rest_id
        .clone()
        .or_else(|| result.id_str.clone())
        .unwrap_or_default();
    let full_text = result.full_text.clone().unwrap_or_default();

    let mut type_counts: HashMap<&str, usize> = HashMap::new();
    let mut items = Vec::new();

    for media in &entities.media {
        let Some(media_id) = media.id_str.clone() else {
            continue;
        };
        let Some(preview_url) = media.media_url_https.clone() else {
            continue;
        };
        let media_type = match media.media_type.as_str() {
            "photo" => MediaType::Image,
            "video" | "animated_gif" => MediaType::Video,
            other => {
                tracing::debug!(media_id = %media_id, kind = other, "skipping unknown media type");
                continue;
            }
        };
        let Some(download_url) = best_quality_url(media) else {
            tracing::debug!(media_id = %media_id, "no usable source URL, skipping");
            continue;
        };

        let type_key = if media_type == MediaType::Image {
            "image"
        } else {
            "video"
        };
        let type_index = *type_counts
            .entry(type_key)
            .and_modify(|n| *n += 1)
            .or_insert(0);

        // Drop the shortened media placeholder from the post text.
        let post_text = match &media.url {
            Some(short_url) => full_text.replace(short_url, "").trim().to_string(),
            None => full_text.trim().to_string(),
        };

        let (width, height) = media
            .original_info
            .as_ref()
            .map(|info| (info.width, info.height))
            .unwrap_or((None, None));

        let aspect_ratio = media
            .video_info
            .as_ref()
            .filter(|info| info.aspect_ratio.len() == 2)
            .map(|info| (info.aspect_ratio[0], info.aspect_ratio[1]));

        items.push(RawApiMedia {
            media_id,
            post_id: post_id.clone(),
            author_handle: author.clone(),
            media_type,
            animated: media.media_type == "animated_gif",
            download_url,
            preview_url,
            expanded_url: media.expanded_url.clone().unwrap_or_default(),
            post_text,
            width,
            height,
            aspect_ratio,
            source_location,
            index: items.len(),
            type_index,
        });
    }

    items
}

/// Best source URL per media type: original-size photos, highest-bitrate
/// MP4 for videos and animated GIFs.
fn best_quality_url(media: &ApiMedia) -> Option<String> {
    match media.media_type.as_str() {
        "photo" => media.media_url_https.as_deref().map(photo_orig_url),
        "video" | "animated_gif" => {
            let variants = &media.video_info.as_ref()?.variants;
            variants
                .iter()
                .filter(|v| v.content_type == "video/mp4")
                .max_by_key(|v| v.bitrate.unwrap_or(0))
                .map(|v| v.url.clone())
        }
        _ => None,
    }
}

/// Rewrite a photo URL to request the original-size variant.
fn photo_orig_url(url: &str) -> String {
    if url.contains("?format=") {
        return url.to_string();
    }
    for ext in ["jpg", "png"] {
        if let Some(stem) = url.strip_suffix(&format!(".{}", ext)) {
            return format!("{}?format={}&name=orig", stem, ext);
        }
    }
    url.to_string()
}
