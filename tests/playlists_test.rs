mod common;

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};
use spotbridge::{
    error::Error,
    spotify::{
        client::{RetryPolicy, WebApi},
        playlists::{filter_playlists, list, search},
    },
    types::PlaylistSummary,
};

const TOKEN: &str = "test-token";

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(20),
    }
}

fn playlist(id: &str, name: &str) -> PlaylistSummary {
    PlaylistSummary {
        id: id.to_string(),
        name: name.to_string(),
        cover_image_url: None,
        track_count: 10,
    }
}

fn playlists_page() -> Value {
    json!({
        "items": [
            {
                "id": "p1",
                "name": "Chill Hits",
                "images": [{ "url": "https://i.scdn.co/image/chill", "height": 300, "width": 300 }],
                "tracks": { "total": 120 }
            },
            { "id": "p2", "name": "Workout", "images": null, "tracks": { "total": 8 } }
        ],
        "total": 2,
        "next": null
    })
}

/// Serves `/me/playlists`, answering 429 for the first `rate_limited` calls.
async fn rate_limited_api(rate_limited: usize) -> (WebApi, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let app = Router::new().route(
        "/me/playlists",
        get(move || {
            let counter = Arc::clone(&counter);
            async move {
                let call = counter.fetch_add(1, Ordering::SeqCst);
                if call < rate_limited {
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        [("Retry-After", "0")],
                        Json(json!({ "error": { "status": 429, "message": "API rate limit exceeded" } })),
                    )
                        .into_response()
                } else {
                    Json(playlists_page()).into_response()
                }
            }
        }),
    );

    let addr = common::spawn_server(app).await;
    let api = WebApi::new(format!("http://{}", addr)).with_retry_policy(fast_retry());
    (api, calls)
}

async fn api_answering(status: StatusCode, body: Value) -> WebApi {
    let app = Router::new().route(
        "/me/playlists",
        get(move || async move { (status, Json(body)).into_response() }),
    );
    let addr = common::spawn_server(app).await;
    WebApi::new(format!("http://{}", addr)).with_retry_policy(fast_retry())
}

#[test]
fn test_filter_playlists() {
    let playlists = vec![playlist("1", "Chill Hits"), playlist("2", "Workout")];

    let filtered = filter_playlists(&playlists, "chill");

    assert_eq!(filtered, vec![playlist("1", "Chill Hits")]);
    // source untouched
    assert_eq!(playlists.len(), 2);
}

#[test]
fn test_filter_playlists_blank_query_returns_all() {
    let playlists = vec![playlist("1", "Chill Hits"), playlist("2", "Workout")];

    assert_eq!(filter_playlists(&playlists, ""), playlists);
    assert_eq!(filter_playlists(&playlists, "   "), playlists);
}

#[test]
fn test_filter_playlists_no_match() {
    let playlists = vec![playlist("1", "Chill Hits")];
    assert!(filter_playlists(&playlists, "metal").is_empty());
}

#[test]
fn test_retry_backoff_doubles_and_caps() {
    let policy = RetryPolicy {
        max_retries: 5,
        base_delay: Duration::from_millis(500),
        max_delay: Duration::from_secs(2),
    };

    assert_eq!(policy.backoff(0, None), Duration::from_millis(500));
    assert_eq!(policy.backoff(1, None), Duration::from_millis(1000));
    assert_eq!(policy.backoff(2, None), Duration::from_secs(2));
    assert_eq!(policy.backoff(10, None), Duration::from_secs(2));

    // Retry-After wins while it stays under the cap
    assert_eq!(
        policy.backoff(0, Some(Duration::from_secs(1))),
        Duration::from_secs(1)
    );
    assert_eq!(
        policy.backoff(0, Some(Duration::from_secs(60))),
        Duration::from_millis(500)
    );
}

#[tokio::test]
async fn test_list_playlists_maps_summaries() {
    let (api, calls) = rate_limited_api(0).await;

    let playlists = list(&api, TOKEN, 20, 0).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        playlists,
        vec![
            PlaylistSummary {
                id: "p1".to_string(),
                name: "Chill Hits".to_string(),
                cover_image_url: Some("https://i.scdn.co/image/chill".to_string()),
                track_count: 120,
            },
            PlaylistSummary {
                id: "p2".to_string(),
                name: "Workout".to_string(),
                cover_image_url: None,
                track_count: 8,
            },
        ]
    );
}

#[tokio::test]
async fn test_list_playlists_recovers_from_rate_limit() {
    let (api, calls) = rate_limited_api(3).await;

    let playlists = list(&api, TOKEN, 20, 0).await.unwrap();

    assert_eq!(playlists.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_list_playlists_gives_up_after_retry_budget() {
    let (api, calls) = rate_limited_api(usize::MAX).await;

    let err = list(&api, TOKEN, 20, 0).await.unwrap_err();

    assert!(matches!(err, Error::UpstreamRateLimited { attempts: 4 }));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_unauthorized_is_token_expired() {
    let api = api_answering(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "status": 401, "message": "The access token expired" } }),
    )
    .await;

    let err = list(&api, TOKEN, 20, 0).await.unwrap_err();

    assert!(matches!(err, Error::TokenExpired));
    assert!(err.is_session_fatal());
}

#[tokio::test]
async fn test_other_status_carries_spotify_message() {
    let api = api_answering(
        StatusCode::NOT_FOUND,
        json!({ "error": { "status": 404, "message": "Non existing id" } }),
    )
    .await;

    let err = list(&api, TOKEN, 20, 0).await.unwrap_err();

    match err {
        Error::Upstream { status, message } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "Non existing id");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_search_sends_query_and_maps_tracks() {
    let app = Router::new().route(
        "/search",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            if params.get("type").map(String::as_str) != Some("track") {
                return StatusCode::BAD_REQUEST.into_response();
            }
            let name = params.get("q").cloned().unwrap_or_default();
            Json(json!({
                "tracks": {
                    "items": [{
                        "id": "t1",
                        "name": name,
                        "uri": "spotify:track:t1",
                        "duration_ms": 215000,
                        "artists": [{ "name": "Daft Punk" }, { "name": "Romanthony" }],
                        "album": { "name": "Discovery" }
                    }]
                }
            }))
            .into_response()
        }),
    );
    let addr = common::spawn_server(app).await;
    let api = WebApi::new(format!("http://{}", addr)).with_retry_policy(fast_retry());

    let tracks = search(&api, TOKEN, "one more time").await.unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "one more time");
    assert_eq!(tracks[0].artist_names, vec!["Daft Punk", "Romanthony"]);
    assert_eq!(tracks[0].album_name, "Discovery");
    assert_eq!(tracks[0].duration_ms, 215_000);
}
