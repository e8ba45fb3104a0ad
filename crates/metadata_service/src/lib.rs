//! Fresh video metadata for the lives about to start.
//!
//! Each call spends API quota, so a run asks for the whole recency window in
//! one batched request and asks only once.

use async_trait::async_trait;
use domain::{LiveRecord, MetadataLookup, VideoMetadata};
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

/// The documented limit of ids per `videos.list` request.
pub const MAX_IDS_PER_REQUEST: usize = 50;

const PARTS: &str = "id,snippet";

#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("video metadata request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("video API rejected the request ({status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("malformed video API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A credential for the video API. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub api_key: ApiKey,
    pub endpoint: String,
}

impl MetadataConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_VIDEOS_ENDPOINT.to_string(),
        }
    }
}

/// Looks up metadata for a batch of videos
#[async_trait]
pub trait VideoMetadataProvider: Send + Sync {
    async fn fetch_video_metadata(&self, ids: &[&str]) -> Result<MetadataLookup, MetadataError>;
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoMetadata,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// `videos.list` of the YouTube Data API
#[derive(Debug, Clone)]
pub struct YouTubeVideos {
    client: reqwest::Client,
    config: MetadataConfig,
}

impl YouTubeVideos {
    pub fn new(client: reqwest::Client, config: MetadataConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl VideoMetadataProvider for YouTubeVideos {
    async fn fetch_video_metadata(&self, ids: &[&str]) -> Result<MetadataLookup, MetadataError> {
        let joined = ids.join(",");
        tracing::debug!(count = ids.len(), "requesting video metadata");

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("id", joined.as_str()),
                ("part", PARTS),
                ("key", self.config.api_key.expose()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(MetadataError::Api { status, message });
        }

        let list: VideoListResponse = serde_json::from_str(&body)?;
        Ok(list
            .items
            .into_iter()
            .map(|item| (item.id, item.snippet))
            .collect())
    }
}

/// Fetches fresh metadata for windowed lives
#[derive(Clone)]
pub struct MetadataEnricher {
    provider: Arc<dyn VideoMetadataProvider>,
}

impl MetadataEnricher {
    /// An enricher backed by the YouTube Data API
    pub fn new(client: reqwest::Client, config: MetadataConfig) -> Self {
        Self::with_provider(Arc::new(YouTubeVideos::new(client, config)))
    }

    pub fn with_provider(provider: Arc<dyn VideoMetadataProvider>) -> Self {
        Self { provider }
    }

    /// Issues one batched lookup for `windowed` and returns the metadata
    /// keyed by video id. An empty window makes no request.
    pub async fn enrich(&self, windowed: &[&LiveRecord]) -> Result<MetadataLookup, MetadataError> {
        if windowed.is_empty() {
            tracing::debug!("no lives in the recency window, skipping metadata lookup");
            return Ok(MetadataLookup::new());
        }
        if windowed.len() > MAX_IDS_PER_REQUEST {
            tracing::warn!(
                count = windowed.len(),
                "recency window exceeds the documented {}-id limit per request",
                MAX_IDS_PER_REQUEST
            );
        }

        let ids: Vec<&str> = windowed.iter().map(|live| live.video_id.as_str()).collect();
        let metadata = self.provider.fetch_video_metadata(&ids).await?;
        tracing::info!(
            requested = ids.len(),
            returned = metadata.len(),
            "fetched video metadata"
        );
        Ok(metadata)
    }
}
