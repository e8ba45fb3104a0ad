use axum::{
    Json, Router, extract::Query, extract::State, http::StatusCode, response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const VIDEOS_PATH: &str = "/youtube/v3/videos";

#[derive(Debug, Deserialize)]
pub struct VideosListParams {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub part: String,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideosListResponse {
    pub kind: String,
    pub etag: String,
    pub page_info: PageInfo,
    pub items: Vec<Video>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_results: i32,
    pub results_per_page: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub kind: String,
    pub etag: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<VideoSnippet>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub published_at: String,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
}

/// Error body in the Google API shape
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Shared state for the video API
#[derive(Clone)]
pub struct VideoApiState {
    pub repo: Arc<dyn datastore::Repository>,
    /// Key callers must present; `None` accepts any request.
    pub api_key: Option<String>,
}

fn error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    let body = ErrorResponse {
        error: ErrorDetail {
            code: status.as_u16(),
            message: message.into(),
        },
    };
    (status, Json(body)).into_response()
}

async fn videos_list(
    State(state): State<VideoApiState>,
    Query(params): Query<VideosListParams>,
) -> impl IntoResponse {
    if let Some(expected) = &state.api_key {
        match params.key.as_deref() {
            Some(key) if key == expected => {}
            Some(_) => {
                return error(
                    StatusCode::BAD_REQUEST,
                    "API key not valid. Please pass a valid API key.",
                );
            }
            None => {
                return error(
                    StatusCode::FORBIDDEN,
                    "The request is missing a valid API key.",
                );
            }
        }
    }

    if params.id.trim().is_empty() {
        return error(
            StatusCode::BAD_REQUEST,
            "No filter selected. Expected one of: id, chart, myRating",
        );
    }

    // Parse which parts are requested
    let parts: Vec<&str> = params.part.split(',').map(|s| s.trim()).collect();
    let include_snippet = parts.contains(&"snippet");

    // Unknown ids are left out, as the real API does
    let items: Vec<Video> = params
        .id
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter_map(|id| state.repo.get_video(id).map(|video| (id, video)))
        .map(|(id, video)| Video {
            kind: "youtube#video".to_string(),
            etag: format!("etag-{id}"),
            id: id.to_string(),
            snippet: include_snippet.then(|| VideoSnippet {
                published_at: video.published_at,
                channel_id: video.channel_id,
                title: video.title,
                description: video.description,
                channel_title: video.channel_title,
            }),
        })
        .collect();

    let count = items.len() as i32;
    let response = VideosListResponse {
        kind: "youtube#videoListResponse".to_string(),
        etag: "etag-list-1".to_string(),
        page_info: PageInfo {
            total_results: count,
            results_per_page: count,
        },
        items,
    };

    (StatusCode::OK, Json(response)).into_response()
}

// Create the router for the video API
pub fn create_router(state: VideoApiState) -> Router {
    Router::new()
        .route(VIDEOS_PATH, get(videos_list))
        .with_state(state)
}
