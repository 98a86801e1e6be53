//! Social preview (Open Graph / Twitter card) metadata.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const OG_IMAGE_WIDTH: u32 = 1200;
pub const OG_IMAGE_HEIGHT: u32 = 630;
pub const SITE_NAME: &str = "Polling App";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraphTags {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: String,
    pub image_width: u32,
    pub image_height: u32,
    pub site_name: String,
    #[serde(rename = "type")]
    pub og_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TwitterCardTags {
    pub card: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollPreview {
    pub poll_id: Uuid,
    pub open_graph: OpenGraphTags,
    pub twitter: TwitterCardTags,
}
