//! HTTP adapters against a local fake of the accounts service and Web API.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use serde_json::json;

use spotify_mcp::auth::Connector;
use spotify_mcp::config::SpotifyConfig;
use spotify_mcp::error::{AuthError, RemoteError};
use spotify_mcp::spotify::{AccountsClient, SearchType, SpotifyApi, WebApiClient};

const GOOD_TOKEN: &str = "access-good";
/// Registered without a path; must come back unchanged.
const REDIRECT_URI: &str = "http://127.0.0.1:8888";

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", GOOD_TOKEN))
        .unwrap_or(false)
}

fn expired() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
    )
        .into_response()
}

async fn token(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Basic "))
        .unwrap_or(false);
    if !basic {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" }))).into_response();
    }

    let grant = form.get("grant_type").map(String::as_str);
    let code = form.get("code").map(String::as_str);
    let redirect_ok = form.get("redirect_uri").map(String::as_str) == Some(REDIRECT_URI);
    match (grant, code) {
        (Some("authorization_code"), Some("good")) if !redirect_ok => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid redirect URI",
            })),
        )
            .into_response(),
        (Some("authorization_code"), Some("good")) => Json(json!({
            "access_token": GOOD_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "user-read-playback-state user-modify-playback-state",
            "refresh_token": "refresh-1",
        }))
        .into_response(),
        (Some("authorization_code"), _) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid authorization code",
            })),
        )
            .into_response(),
        (Some("refresh_token"), _) => Json(json!({
            "access_token": "access-refreshed",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "user-read-playback-state",
        }))
        .into_response(),
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn me(headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return expired();
    }
    Json(json!({ "id": "listener", "display_name": "Listener" })).into_response()
}

async fn player(headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return expired();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn volume() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, [(header::RETRY_AFTER, "3")], "").into_response()
}

async fn pause() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": { "status": 403, "message": "Player command failed: Premium required" } })),
    )
        .into_response()
}

async fn search(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !bearer_ok(&headers) {
        return expired();
    }
    let q = params.get("q").cloned().unwrap_or_default();
    let kind = params.get("type").cloned().unwrap_or_default();
    let limit = params.get("limit").cloned().unwrap_or_default();
    Json(json!({
        "tracks": {
            "items": [{
                "name": format!("{}|{}|{}", q, kind, limit),
                "uri": "spotify:track:1",
                "artists": [{ "name": "The Beatles" }],
                "album": { "name": "Past Masters" },
                "duration_ms": 431_000,
            }],
            "next": null,
            "total": 1,
        }
    }))
    .into_response()
}

async fn spawn_fake() -> SocketAddr {
    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/me", get(me))
        .route("/v1/me/player", get(player))
        .route("/v1/me/player/volume", put(volume))
        .route("/v1/me/player/pause", put(pause))
        .route("/v1/search", get(search));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn accounts(addr: SocketAddr) -> AccountsClient {
    let config = SpotifyConfig::new(
        Some("test-client".to_string()),
        Some("test-secret".to_string()),
        Some(REDIRECT_URI.to_string()),
        Some(std::env::temp_dir().join("unused-spotify-cache.json")),
    )
    .unwrap();
    AccountsClient::new(config).with_endpoints(
        format!("http://{}/api/token", addr),
        format!("http://{}/v1", addr),
    )
}

fn api(addr: SocketAddr, token: &str) -> WebApiClient {
    WebApiClient::with_base_url(reqwest::Client::new(), format!("http://{}/v1", addr), token)
}

#[tokio::test]
async fn code_exchange_and_connect() {
    let addr = spawn_fake().await;
    let accounts = accounts(addr);

    let token = accounts.exchange_code("good").await.unwrap();
    assert_eq!(token.access_token, GOOD_TOKEN);
    assert_eq!(token.refresh_token.as_deref(), Some("refresh-1"));
    assert!(!token.is_expired());
    assert!(token.covers_scopes(&["user-read-playback-state"]));

    let client = accounts.connect(&token);
    let user = client.current_user().await.unwrap();
    assert_eq!(user.id, "listener");
}

#[tokio::test]
async fn rejected_code_reports_provider_reason() {
    let addr = spawn_fake().await;
    let err = accounts(addr).exchange_code("stale").await.unwrap_err();

    match err {
        AuthError::ExchangeRejected(reason) => {
            assert_eq!(reason, "invalid_grant (Invalid authorization code)")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn refresh_keeps_previous_refresh_token() {
    let addr = spawn_fake().await;
    let token = accounts(addr).refresh("refresh-1").await.unwrap();

    assert_eq!(token.access_token, "access-refreshed");
    assert_eq!(token.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn unreachable_token_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = accounts(addr).exchange_code("good").await.unwrap_err();
    assert!(matches!(err, AuthError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn no_content_means_no_playback() {
    let addr = spawn_fake().await;
    let playback = api(addr, GOOD_TOKEN).current_playback().await.unwrap();
    assert!(playback.is_none());
}

#[tokio::test]
async fn search_sends_query_type_and_limit() {
    let addr = spawn_fake().await;
    let results = api(addr, GOOD_TOKEN)
        .search("Hey Jude artist:The Beatles", SearchType::Track, 1)
        .await
        .unwrap();

    let track = results.first_track().unwrap();
    assert_eq!(track.name, "Hey Jude artist:The Beatles|track|1");
    assert_eq!(track.album_name(), "Past Masters");
}

#[tokio::test]
async fn error_statuses_map_to_remote_errors() {
    let addr = spawn_fake().await;

    let err = api(addr, "stale").current_user().await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Unauthorized("The access token expired".to_string())
    );

    let err = api(addr, GOOD_TOKEN).set_volume(30).await.unwrap_err();
    assert_eq!(err, RemoteError::RateLimited { retry_after: Some(3) });

    let err = api(addr, GOOD_TOKEN).pause_playback().await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Api {
            status: 403,
            message: "Player command failed: Premium required".to_string(),
        }
    );

    let err = api(addr, GOOD_TOKEN).next_track().await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound(_)), "got {:?}", err);
}
