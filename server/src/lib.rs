//! A stand-in for every upstream the pipeline talks to: the static data host
//! (`/data/{name}`), the video API (`/youtube/v3/videos`) and a control API
//! (`/control/...`) for seeding both.

use axum::Router;
use datastore::Repository;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use video_service::VideoApiState;

/// Builds the combined router
pub fn app(repo: Arc<dyn Repository>, api_key: Option<String>) -> Router {
    video_service::create_router(VideoApiState {
        repo: repo.clone(),
        api_key,
    })
    .merge(control_service::create_router(repo.clone()))
    .merge(control_service::create_asset_router(repo))
}

/// A mock upstream running on a local port
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub repo: Arc<dyn Repository>,
    handle: JoinHandle<()>,
}

impl MockUpstream {
    /// Binds `127.0.0.1:0` and serves in a background task
    pub async fn spawn(repo: Arc<dyn Repository>, api_key: Option<String>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let router = app(repo.clone(), api_key);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("mock upstream stopped: {}", e);
            }
        });

        Ok(Self { addr, repo, handle })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn data_url(&self, name: &str) -> String {
        self.url(&format!("/data/{name}"))
    }

    pub fn videos_url(&self) -> String {
        self.url(video_service::VIDEOS_PATH)
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
