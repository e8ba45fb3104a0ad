//! Fetches the three inputs of a run: the published image map, the
//! previously published schedule and the current schedule page.
//!
//! The first two are optional. Their failures are captured as
//! [`Availability::Unavailable`] and never abort a run. The schedule page is
//! mandatory and its failure is returned as an error.

mod availability;

use async_trait::async_trait;
use domain::{ImageDictionary, SnapshotRecord};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use availability::Availability;

pub const DEFAULT_IMAGE_MAP_URL: &str = "https://holonow.github.io/data/imageMap.json";
pub const DEFAULT_PREVIOUS_SCHEDULE_URL: &str = "https://holonow.github.io/data/schedule.json";
pub const DEFAULT_SCHEDULE_PAGE_URL: &str = "https://schedule.hololive.tv/simple";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
    #[error("malformed body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Where the three sources live
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub image_map_url: String,
    pub previous_schedule_url: String,
    pub schedule_page_url: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            image_map_url: DEFAULT_IMAGE_MAP_URL.to_string(),
            previous_schedule_url: DEFAULT_PREVIOUS_SCHEDULE_URL.to_string(),
            schedule_page_url: DEFAULT_SCHEDULE_PAGE_URL.to_string(),
        }
    }
}

/// The sources a run reads from
#[async_trait]
pub trait ScheduleSources: Send + Sync {
    async fn fetch_image_map(&self) -> Availability<ImageDictionary>;

    async fn fetch_previous_schedule(&self) -> Availability<Vec<SnapshotRecord>>;

    async fn fetch_schedule_html(&self) -> Result<String, FetchError>;
}

/// Everything fetched for one run
#[derive(Debug)]
pub struct FetchedSources {
    pub image_map: Availability<ImageDictionary>,
    pub previous_schedule: Availability<Vec<SnapshotRecord>>,
    pub schedule_html: String,
}

/// Runs the three fetches concurrently and waits for all of them.
///
/// Fails only if the schedule page could not be fetched, and only after the
/// other two have settled.
pub async fn fetch_all(sources: &dyn ScheduleSources) -> Result<FetchedSources, FetchError> {
    let (image_map, previous_schedule, schedule_html) = tokio::join!(
        sources.fetch_image_map(),
        sources.fetch_previous_schedule(),
        sources.fetch_schedule_html(),
    );

    Ok(FetchedSources {
        image_map,
        previous_schedule,
        schedule_html: schedule_html?,
    })
}

/// Builds the HTTP client shared by the fetcher and the metadata API.
pub fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(FetchError::Client)
}

/// Fetches the sources over HTTP
#[derive(Debug, Clone)]
pub struct RemoteSourceFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl RemoteSourceFetcher {
    pub fn new(client: reqwest::Client, config: FetcherConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        tracing::debug!("{} returned {} bytes", url, body.len());
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ScheduleSources for RemoteSourceFetcher {
    async fn fetch_image_map(&self) -> Availability<ImageDictionary> {
        let result = self.get_json(&self.config.image_map_url).await;
        Availability::settle("image map", result)
    }

    async fn fetch_previous_schedule(&self) -> Availability<Vec<SnapshotRecord>> {
        let result = self.get_json(&self.config.previous_schedule_url).await;
        Availability::settle("previous schedule", result)
    }

    async fn fetch_schedule_html(&self) -> Result<String, FetchError> {
        self.get_text(&self.config.schedule_page_url).await
    }
}
