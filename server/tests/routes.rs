use datastore::{InMemoryRepository, Repository, SCHEDULE_PAGE_ASSET};
use domain::VideoMetadata;
use mock_server::MockUpstream;
use serde_json::{Value, json};
use std::sync::Arc;

async fn upstream(api_key: Option<&str>) -> MockUpstream {
    let repo = Arc::new(InMemoryRepository::new());
    repo.add_video(
        "v1".to_string(),
        VideoMetadata {
            title: "Video One".to_string(),
            ..Default::default()
        },
    );
    MockUpstream::spawn(repo, api_key.map(str::to_string))
        .await
        .unwrap()
}

#[tokio::test]
async fn videos_list_returns_snippets_for_known_ids() {
    let upstream = upstream(Some("k")).await;

    let body: Value = reqwest::Client::new()
        .get(upstream.videos_url())
        .query(&[("id", "v1,missing"), ("part", "id,snippet"), ("key", "k")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["kind"], "youtube#videoListResponse");
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["id"], "v1");
    assert_eq!(body["items"][0]["snippet"]["title"], "Video One");
    assert!(body["items"][0]["snippet"].get("channelTitle").is_some());
}

#[tokio::test]
async fn videos_list_without_snippet_part_omits_it() {
    let upstream = upstream(None).await;

    let body: Value = reqwest::Client::new()
        .get(upstream.videos_url())
        .query(&[("id", "v1"), ("part", "id")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body["items"][0].get("snippet").is_none());
}

#[tokio::test]
async fn videos_list_checks_the_key() {
    let upstream = upstream(Some("k")).await;
    let client = reqwest::Client::new();

    let missing = client
        .get(upstream.videos_url())
        .query(&[("id", "v1"), ("part", "snippet")])
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 403);

    let wrong = client
        .get(upstream.videos_url())
        .query(&[("id", "v1"), ("part", "snippet"), ("key", "nope")])
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status().as_u16(), 400);
    let body: Value = wrong.json().await.unwrap();
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn control_api_seeds_videos_and_assets() {
    let upstream = upstream(None).await;
    let client = reqwest::Client::new();

    let created = client
        .post(upstream.url("/control/videos"))
        .json(&json!({"id": "v2", "title": "Video Two", "channelTitle": "Two"}))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    assert_eq!(
        upstream.repo.get_video("v2").map(|v| v.channel_title),
        Some("Two".to_string())
    );

    let stored = client
        .put(upstream.url(&format!("/control/assets/{SCHEDULE_PAGE_ASSET}")))
        .header("content-type", "text/html")
        .body("<html></html>")
        .send()
        .await
        .unwrap();
    assert_eq!(stored.status().as_u16(), 201);

    let served = client
        .get(upstream.data_url(SCHEDULE_PAGE_ASSET))
        .send()
        .await
        .unwrap();
    assert_eq!(served.status().as_u16(), 200);
    assert_eq!(
        served.headers()["content-type"].to_str().unwrap(),
        "text/html"
    );
    assert_eq!(served.text().await.unwrap(), "<html></html>");

    let removed = client
        .delete(upstream.url(&format!("/control/assets/{SCHEDULE_PAGE_ASSET}")))
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status().as_u16(), 204);

    let gone = client
        .get(upstream.data_url(SCHEDULE_PAGE_ASSET))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}
