//! TmdbClient against a mock TMDB server bound to a random local port.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use tmdb_client::{CachedProvider, MetadataFetchError, MetadataProvider, TmdbClient, TmdbConfig};

const API_KEY: &str = "test-key";
const SLOW_MOVIE: u32 = 7;

// ============================================================================
// Mock TMDB
// ============================================================================

async fn movie_details(
    Path(movie_id): Path<u32>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if params.get("api_key").map(String::as_str) != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status_code": 7, "status_message": "Invalid API key"})),
        )
            .into_response();
    }

    match movie_id {
        19995 => Json(json!({
            "id": 19995,
            "title": "Avatar",
            "poster_path": "/kyeqWdyUXW608qlYkRqosgbbJyK.jpg",
            "homepage": "http://www.avatarmovie.com/",
            "overview": "A paraplegic Marine is dispatched to the moon Pandora.",
            "release_date": "2009-12-10",
            "vote_average": 7.2,
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "language_seen": params.get("language")
        }))
        .into_response(),
        500 => Json(json!({"id": 500, "title": "No details"})).into_response(),
        SLOW_MOVIE => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({
                "release_date": "2000-01-01",
                "vote_average": 1.0,
                "genres": []
            }))
            .into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"status_code": 34, "status_message": "The resource you requested could not be found."})),
        )
            .into_response(),
    }
}

async fn start_mock_tmdb() -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock TMDB");
    let addr = listener.local_addr().expect("Failed to get local address");

    let app = Router::new().route("/movie/:movie_id", get(movie_details));
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock TMDB failed");
    });

    (format!("http://{}", addr), handle)
}

fn client_for(addr: &str) -> TmdbClient {
    let config = TmdbConfig::new(API_KEY)
        .with_api_url(addr)
        .with_image_base_url("https://image.tmdb.org/t/p")
        .with_timeout(Duration::from_millis(500));
    TmdbClient::new(config).expect("Failed to build client")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_details_success() {
    let (addr, handle) = start_mock_tmdb().await;
    let client = client_for(&addr);

    let metadata = client.fetch_details(19995, "w500").await.expect("fetch failed");

    assert_eq!(metadata.movie_id, 19995);
    assert_eq!(
        metadata.poster_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/kyeqWdyUXW608qlYkRqosgbbJyK.jpg")
    );
    assert_eq!(metadata.homepage_url.as_deref(), Some("http://www.avatarmovie.com/"));
    assert_eq!(metadata.release_date, "2009-12-10");
    assert_eq!(metadata.rating, 7.2);
    assert_eq!(metadata.genres, vec!["Action", "Science Fiction"]);

    handle.abort();
}

#[tokio::test]
async fn test_not_found_is_status_error() {
    let (addr, handle) = start_mock_tmdb().await;
    let client = client_for(&addr);

    let err = client.fetch_details(12, "w342").await.unwrap_err();

    assert!(err.is_not_found(), "unexpected error: {err:?}");
    assert_eq!(err.movie_id(), 12);

    handle.abort();
}

#[tokio::test]
async fn test_wrong_api_key_is_status_error() {
    let (addr, handle) = start_mock_tmdb().await;
    let client = TmdbClient::new(TmdbConfig::new("wrong").with_api_url(addr.as_str())).unwrap();

    let err = client.fetch_details(19995, "w342").await.unwrap_err();
    assert!(matches!(err, MetadataFetchError::Status { status: 401, .. }));

    handle.abort();
}

#[tokio::test]
async fn test_missing_fields_is_malformed() {
    let (addr, handle) = start_mock_tmdb().await;
    let client = client_for(&addr);

    let err = client.fetch_details(500, "w342").await.unwrap_err();
    assert!(matches!(err, MetadataFetchError::Malformed { movie_id: 500, .. }));

    handle.abort();
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let (addr, handle) = start_mock_tmdb().await;
    let client = client_for(&addr);

    let err = client.fetch_details(SLOW_MOVIE, "w342").await.unwrap_err();
    assert!(
        matches!(err, MetadataFetchError::Timeout { movie_id: SLOW_MOVIE, .. }),
        "unexpected error: {err:?}"
    );

    handle.abort();
}

#[tokio::test]
async fn test_unreachable_service_is_request_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client_for(&addr).fetch_details(19995, "w342").await.unwrap_err();
    assert!(matches!(
        err,
        MetadataFetchError::Request { movie_id: 19995, .. } | MetadataFetchError::Timeout { .. }
    ));
}

#[tokio::test]
async fn test_cached_client_reuses_response() {
    let (addr, handle) = start_mock_tmdb().await;
    let cached = CachedProvider::new(client_for(&addr), 4);

    let first = cached.fetch_details(19995, "w342").await.unwrap();
    handle.abort();
    // Served from cache even though the server is gone
    let second = cached.fetch_details(19995, "w342").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(cached.stats(), (1, 1));
}
