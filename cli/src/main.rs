use anyhow::{Context, Result};
use clap::Parser;
use metadata_service::{ApiKey, DEFAULT_VIDEOS_ENDPOINT, MetadataConfig, MetadataEnricher};
use pipeline::{FileSink, OutputConfig, Pipeline};
use source_fetcher::{
    DEFAULT_IMAGE_MAP_URL, DEFAULT_PREVIOUS_SCHEDULE_URL, DEFAULT_SCHEDULE_PAGE_URL,
    FetcherConfig, RemoteSourceFetcher, http_client,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "schedule-sync",
    version,
    about = "Rebuild the enriched live schedule and image map"
)]
struct Cli {
    /// YouTube Data API key used for video metadata.
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Endpoint of the `videos.list` API.
    #[arg(long, env = "SCHEDULE_SYNC_VIDEOS_ENDPOINT", default_value = DEFAULT_VIDEOS_ENDPOINT)]
    videos_endpoint: String,

    /// Previously published image map.
    #[arg(long, env = "SCHEDULE_SYNC_IMAGE_MAP_URL", default_value = DEFAULT_IMAGE_MAP_URL)]
    image_map_url: String,

    /// Previously published schedule.
    #[arg(
        long,
        env = "SCHEDULE_SYNC_PREVIOUS_SCHEDULE_URL",
        default_value = DEFAULT_PREVIOUS_SCHEDULE_URL
    )]
    previous_schedule_url: String,

    /// Schedule page to scrape.
    #[arg(long, env = "SCHEDULE_SYNC_SCHEDULE_PAGE_URL", default_value = DEFAULT_SCHEDULE_PAGE_URL)]
    schedule_page_url: String,

    /// Directory receiving schedule.json and imageMap.json.
    #[arg(long, env = "SCHEDULE_SYNC_OUT_DIR", default_value = "build")]
    out_dir: PathBuf,

    /// Per-request timeout in seconds. Zero disables it.
    #[arg(long, env = "SCHEDULE_SYNC_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
}

impl Cli {
    fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            image_map_url: self.image_map_url.clone(),
            previous_schedule_url: self.previous_schedule_url.clone(),
            schedule_page_url: self.schedule_page_url.clone(),
        }
    }

    fn metadata_config(&self) -> MetadataConfig {
        MetadataConfig {
            api_key: ApiKey::new(self.api_key.clone()),
            endpoint: self.videos_endpoint.clone(),
        }
    }

    fn output_config(&self) -> OutputConfig {
        OutputConfig {
            dir: self.out_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        tracing::error!("schedule sync failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let client = http_client(cli.timeout()).context("failed to build HTTP client")?;
    let sources = RemoteSourceFetcher::new(client.clone(), cli.fetcher_config());
    let enricher = MetadataEnricher::new(client, cli.metadata_config());
    let sink = FileSink::new(cli.output_config());

    let summary = Pipeline::new(Arc::new(sources), enricher, Arc::new(sink))
        .run()
        .await
        .context("schedule pipeline failed")?;

    tracing::info!(
        lives = summary.lives,
        windowed = summary.windowed,
        fresh = summary.fresh,
        titled = summary.titled,
        images = summary.images,
        metadata_failed = summary.metadata_failed,
        "wrote artifacts to {}",
        cli.out_dir.display()
    );
    Ok(())
}
