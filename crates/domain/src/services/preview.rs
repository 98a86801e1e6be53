//! Social preview metadata for poll pages.

use crate::models::poll::Poll;
use crate::models::preview::{
    OpenGraphTags, PollPreview, TwitterCardTags, OG_IMAGE_HEIGHT, OG_IMAGE_WIDTH, SITE_NAME,
};

/// Fallback description used when a poll has none.
pub fn default_description(title: &str, option_count: i64, vote_count: i64) -> String {
    let mut text = format!(
        "Vote on \"{}\" - {} options available",
        title, option_count
    );
    if vote_count > 0 {
        text.push_str(&format!(" ({} votes so far)", vote_count));
    }
    text
}

pub fn build_poll_preview(
    poll: &Poll,
    option_count: i64,
    vote_count: i64,
    base_url: &str,
) -> PollPreview {
    let base = base_url.trim_end_matches('/');
    let title = format!("{} - {}", poll.title, SITE_NAME);
    let description = poll
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| default_description(&poll.title, option_count, vote_count));
    let url = format!("{}/polls/{}", base, poll.id);
    let image = format!("{}/api/og/poll/{}", base, poll.id);

    PollPreview {
        poll_id: poll.id,
        open_graph: OpenGraphTags {
            title: title.clone(),
            description: description.clone(),
            url,
            image: image.clone(),
            image_width: OG_IMAGE_WIDTH,
            image_height: OG_IMAGE_HEIGHT,
            site_name: SITE_NAME.to_string(),
            og_type: "website".to_string(),
        },
        twitter: TwitterCardTags {
            card: "summary_large_image".to_string(),
            title,
            description,
            image,
        },
    }
}
