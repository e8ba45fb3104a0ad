//! One run of the schedule pipeline: fetch, parse, enrich, merge, write.

mod sink;

use chrono::{DateTime, Utc};
use domain::MetadataLookup;
use metadata_service::MetadataEnricher;
use schedule_merger::{merge, recency_window};
use schedule_parser::{ParseError, parse_schedule};
use source_fetcher::{FetchError, ScheduleSources, fetch_all};
use std::sync::Arc;

pub use sink::{ArtifactSink, FileSink, IMAGE_MAP_FILE, OutputConfig, SCHEDULE_FILE, SinkError};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("schedule page unavailable: {0}")]
    Fetch(#[from] FetchError),
    #[error("schedule page unreadable: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// What a completed run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lives: usize,
    pub windowed: usize,
    pub fresh: usize,
    pub titled: usize,
    pub images: usize,
    pub image_map_available: bool,
    pub previous_schedule_available: bool,
    pub metadata_failed: bool,
}

pub struct Pipeline {
    sources: Arc<dyn ScheduleSources>,
    enricher: MetadataEnricher,
    sink: Arc<dyn ArtifactSink>,
}

impl Pipeline {
    pub fn new(
        sources: Arc<dyn ScheduleSources>,
        enricher: MetadataEnricher,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            sources,
            enricher,
            sink,
        }
    }

    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        self.run_at(Utc::now()).await
    }

    /// Runs once with `now` as the current instant.
    ///
    /// Nothing is written unless the schedule page was fetched and parsed. A
    /// failed metadata lookup does not fail the run; the merge then relies on
    /// the previous snapshot alone.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary, PipelineError> {
        let fetched = fetch_all(self.sources.as_ref()).await?;
        let image_map_available = fetched.image_map.is_available();
        let previous_schedule_available = fetched.previous_schedule.is_available();

        let parsed = parse_schedule(&fetched.schedule_html, fetched.image_map.value(), now)?;
        let previous = fetched.previous_schedule.unwrap_or_default();
        tracing::info!(
            lives = parsed.lives.len(),
            previous = previous.len(),
            "parsed current schedule"
        );

        let windowed = recency_window(&parsed.lives, now);
        let mut metadata_failed = false;
        let fresh = match self.enricher.enrich(&windowed).await {
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::warn!("metadata lookup failed, using previous titles only: {}", e);
                metadata_failed = true;
                MetadataLookup::new()
            }
        };

        let records = merge(&parsed.lives, &previous, &fresh);

        let (schedule, images) = futures::future::join(
            self.sink.write_schedule(&records),
            self.sink.write_image_map(&parsed.dict),
        )
        .await;
        schedule?;
        images?;

        let summary = RunSummary {
            lives: records.len(),
            windowed: windowed.len(),
            fresh: fresh.len(),
            titled: records.iter().filter(|r| r.title.is_some()).count(),
            images: parsed.dict.len(),
            image_map_available,
            previous_schedule_available,
            metadata_failed,
        };
        tracing::debug!(?summary, "schedule written");
        Ok(summary)
    }
}
