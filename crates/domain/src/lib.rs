use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Image key to image URL, carried from run to run so that records can refer
/// to avatars by a short key.
pub type ImageDictionary = BTreeMap<String, String>;

/// Fresh metadata keyed by video id.
pub type MetadataLookup = HashMap<String, VideoMetadata>;

/// A single scheduled broadcast as read from the schedule page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveRecord {
    pub video_id: String,
    pub time: DateTime<Utc>,
    pub link: String,
    pub streamer: String,
    /// Key into the [`ImageDictionary`] for the streamer's avatar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Preview thumbnail of the broadcast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Keys into the [`ImageDictionary`] for collaborating streamers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guests: Vec<String>,
    #[serde(default)]
    pub streaming: bool,
}

/// A record from the previously published schedule.
///
/// Every field except the id is optional so that older or partially written
/// snapshots still deserialize. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub video_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streamer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl SnapshotRecord {
    /// The title, if present and non-empty.
    pub fn usable_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }
}

/// Metadata returned by the video API for a single video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: String,
}

/// Metadata in overlayable form: every field may be missing.
///
/// Both stale snapshot data and fresh API metadata are lifted into this shape
/// before they are combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub published_at: Option<String>,
}

impl From<&SnapshotRecord> for MetadataFields {
    fn from(record: &SnapshotRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            channel_id: None,
            channel_title: record.channel_title.clone(),
            published_at: record.published_at.clone(),
        }
    }
}

impl From<&VideoMetadata> for MetadataFields {
    fn from(metadata: &VideoMetadata) -> Self {
        Self {
            title: Some(metadata.title.clone()),
            description: Some(metadata.description.clone()),
            channel_id: Some(metadata.channel_id.clone()),
            channel_title: Some(metadata.channel_title.clone()),
            published_at: Some(metadata.published_at.clone()),
        }
    }
}

/// A current live record plus the single title field gained by enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedLiveRecord {
    #[serde(flatten)]
    pub live: LiveRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl EnrichedLiveRecord {
    pub fn video_id(&self) -> &str {
        &self.live.video_id
    }
}
