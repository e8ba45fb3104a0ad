use async_trait::async_trait;
use domain::{EnrichedLiveRecord, ImageDictionary};
use serde_json::Error as JsonError;
use std::io;
use std::path::{Path, PathBuf};

pub const SCHEDULE_FILE: &str = "schedule.json";
pub const IMAGE_MAP_FILE: &str = "imageMap.json";

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode artifact: {0}")]
    Encode(#[from] JsonError),
}

/// Receives the two artifacts of a run
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn write_schedule(&self, records: &[EnrichedLiveRecord]) -> Result<(), SinkError>;

    async fn write_image_map(&self, dict: &ImageDictionary) -> Result<(), SinkError>;
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl OutputConfig {
    pub fn schedule_path(&self) -> PathBuf {
        self.dir.join(SCHEDULE_FILE)
    }

    pub fn image_map_path(&self) -> PathBuf {
        self.dir.join(IMAGE_MAP_FILE)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("build"),
        }
    }
}

/// Writes the artifacts as compact JSON files into a directory
#[derive(Debug, Clone)]
pub struct FileSink {
    config: OutputConfig,
}

impl FileSink {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    async fn write(&self, path: &Path, bytes: Vec<u8>) -> Result<(), SinkError> {
        let io_error = |source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        };

        tokio::fs::create_dir_all(&self.config.dir)
            .await
            .map_err(io_error)?;
        tokio::fs::write(path, &bytes).await.map_err(io_error)?;

        tracing::debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl ArtifactSink for FileSink {
    async fn write_schedule(&self, records: &[EnrichedLiveRecord]) -> Result<(), SinkError> {
        let bytes = serde_json::to_vec(records)?;
        self.write(&self.config.schedule_path(), bytes).await
    }

    async fn write_image_map(&self, dict: &ImageDictionary) -> Result<(), SinkError> {
        let bytes = serde_json::to_vec(dict)?;
        self.write(&self.config.image_map_path(), bytes).await
    }
}
