use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use domain::VideoMetadata;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Asset names the mock upstream serves under `/data/`.
pub const IMAGE_MAP_ASSET: &str = "imageMap.json";
pub const SCHEDULE_ASSET: &str = "schedule.json";
pub const SCHEDULE_PAGE_ASSET: &str = "schedule.html";

/// A stored upstream document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub content_type: String,
    pub body: String,
}

impl Asset {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            content_type: "application/json".to_string(),
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/html; charset=utf-8".to_string(),
            body: body.into(),
        }
    }
}

/// Repository trait for the mock upstream's state
/// This allows swapping the in-memory store for a fixture-backed one
pub trait Repository: Send + Sync {
    /// Get a video's metadata by ID
    fn get_video(&self, id: &str) -> Option<VideoMetadata>;

    /// Add or replace a video's metadata
    fn add_video(&self, id: String, video: VideoMetadata);

    /// Get a stored document by name
    fn get_asset(&self, name: &str) -> Option<Asset>;

    /// Store a document under a name, replacing any previous one
    fn put_asset(&self, name: String, asset: Asset);

    /// Remove a document; returns whether one was stored
    fn remove_asset(&self, name: &str) -> bool;
}

/// In-memory implementation of the Repository trait
pub struct InMemoryRepository {
    videos: Arc<RwLock<HashMap<String, VideoMetadata>>>,
    assets: Arc<RwLock<HashMap<String, Asset>>>,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            videos: Arc::new(RwLock::new(HashMap::new())),
            assets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository holding a small schedule around `now`
    pub fn with_dummy_data(now: DateTime<Utc>) -> Self {
        let repo = Self::new();
        repo.populate_dummy_data(now);
        repo
    }

    fn populate_dummy_data(&self, now: DateTime<Utc>) {
        let lives = [
            ("mock-video-1", "Mock Streamer A", now - TimeDelta::hours(1), true),
            ("mock-video-2", "Mock Streamer B", now + TimeDelta::hours(2), false),
            ("mock-video-3", "Mock Streamer C", now + TimeDelta::hours(30), false),
        ];

        for (i, (id, streamer, _, _)) in lives.iter().enumerate() {
            self.add_video(
                id.to_string(),
                VideoMetadata {
                    title: format!("Mock Live Stream {}", i + 1),
                    description: "This is a mock video for testing the schedule pipeline"
                        .to_string(),
                    channel_id: format!("channel-{}", i + 1),
                    channel_title: streamer.to_string(),
                    published_at: "2023-01-01T00:00:00Z".to_string(),
                },
            );
        }

        self.put_asset(
            SCHEDULE_PAGE_ASSET.to_string(),
            Asset::html(render_schedule_page(&lives)),
        );
        self.put_asset(
            SCHEDULE_ASSET.to_string(),
            Asset::json(r#"[{"videoId":"mock-video-1","title":"Mock Live Stream (stale)"}]"#),
        );
        self.put_asset(IMAGE_MAP_ASSET.to_string(), Asset::json("{}"));
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for InMemoryRepository {
    fn get_video(&self, id: &str) -> Option<VideoMetadata> {
        self.videos
            .read()
            .expect("Failed to acquire read lock on videos")
            .get(id)
            .cloned()
    }

    fn add_video(&self, id: String, video: VideoMetadata) {
        self.videos
            .write()
            .expect("Failed to acquire write lock on videos")
            .insert(id, video);
    }

    fn get_asset(&self, name: &str) -> Option<Asset> {
        self.assets
            .read()
            .expect("Failed to acquire read lock on assets")
            .get(name)
            .cloned()
    }

    fn put_asset(&self, name: String, asset: Asset) {
        self.assets
            .write()
            .expect("Failed to acquire write lock on assets")
            .insert(name, asset);
    }

    fn remove_asset(&self, name: &str) -> bool {
        self.assets
            .write()
            .expect("Failed to acquire write lock on assets")
            .remove(name)
            .is_some()
    }
}

/// Renders lives in the schedule page layout, grouped under `MM/DD` headers
/// in Japan time.
pub fn render_schedule_page(lives: &[(&str, &str, DateTime<Utc>, bool)]) -> String {
    let jst = FixedOffset::east_opt(9 * 3600).expect("JST offset should be valid");

    let mut body = String::new();
    let mut current_day = String::new();
    for (id, streamer, time, streaming) in lives {
        let local = time.with_timezone(&jst);
        let day = local.format("%m/%d").to_string();
        if day != current_day {
            body.push_str(&format!(
                "<div class=\"row\"><div class=\"holodule navbar-text\">{day}</div></div>\n"
            ));
            current_day = day;
        }
        let border = if *streaming { "red" } else { "#cccccc" };
        body.push_str(&format!(
            concat!(
                "<a href=\"https://www.youtube.com/watch?v={id}\" class=\"thumbnail\" ",
                "style=\"border: 3px {border} solid;\">",
                "<div class=\"datetime\">{time}</div>",
                "<div class=\"name\">{streamer}</div>",
                "<img src=\"https://img.youtube.com/vi/{id}/mqdefault.jpg\">",
                "<img src=\"https://yt3.ggpht.com/{id}-avatar\">",
                "</a>\n"
            ),
            id = id,
            border = border,
            time = local.format("%H:%M"),
            streamer = streamer,
        ));
    }

    format!("<html><body><div class=\"container\">\n{body}</div></body></html>")
}
