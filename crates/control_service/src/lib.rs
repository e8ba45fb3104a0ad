use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use datastore::Asset;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for creating a new video
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: String,
}

/// Response for successful creation
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub success: bool,
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Handler for creating a new video
async fn create_video(
    State(repo): State<Arc<dyn datastore::Repository>>,
    Json(request): Json<CreateVideoRequest>,
) -> impl IntoResponse {
    let video = domain::VideoMetadata {
        title: request.title,
        description: request.description,
        channel_id: request.channel_id,
        channel_title: request.channel_title,
        published_at: request.published_at,
    };

    repo.add_video(request.id.clone(), video);

    let response = CreateResponse {
        success: true,
        message: format!("Video '{}' created successfully", request.id),
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

/// Handler for storing an upstream document
async fn put_asset(
    State(repo): State<Arc<dyn datastore::Repository>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    repo.put_asset(name.clone(), Asset { content_type, body });

    let response = CreateResponse {
        success: true,
        message: format!("Asset '{}' stored successfully", name),
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

/// Handler for removing an upstream document, making it unavailable
async fn delete_asset(
    State(repo): State<Arc<dyn datastore::Repository>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    if repo.remove_asset(&name) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(&name)
    }
}

/// Handler serving a stored document the way a static host would
async fn get_asset(
    State(repo): State<Arc<dyn datastore::Repository>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match repo.get_asset(&name) {
        Some(asset) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, asset.content_type)],
            asset.body,
        )
            .into_response(),
        None => not_found(&name),
    }
}

fn not_found(name: &str) -> axum::response::Response {
    let error = ErrorResponse {
        success: false,
        error: format!("Asset '{}' not found", name),
    };
    (StatusCode::NOT_FOUND, Json(error)).into_response()
}

/// Create the router for the control API
pub fn create_router(repo: Arc<dyn datastore::Repository>) -> Router {
    Router::new()
        .route("/control/videos", post(create_video))
        .route("/control/assets/{name}", put(put_asset).delete(delete_asset))
        .with_state(repo)
}

/// Create the router serving stored documents under `/data/`
pub fn create_asset_router(repo: Arc<dyn datastore::Repository>) -> Router {
    Router::new()
        .route("/data/{name}", get(get_asset))
        .with_state(repo)
}
