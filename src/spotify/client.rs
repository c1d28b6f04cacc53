//! HTTP adapter for the Spotify Web API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::API_BASE_URL;
use crate::error::RemoteError;

use super::models::{Page, PlaybackState, Playlist, SearchResults, SearchType, UserProfile};
use super::SpotifyApi;

/// Production `SpotifyApi` backed by `reqwest`, holding one bearer token.
///
/// Token expiry is not tracked here: a stale token surfaces as
/// `RemoteError::Unauthorized` on the next call.
pub struct WebApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: SecretString,
}

impl WebApiClient {
    pub fn new(http: reqwest::Client, access_token: impl Into<String>) -> Self {
        Self::with_base_url(http, API_BASE_URL, access_token)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: SecretString::from(access_token.into()),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(self.access_token.expose_secret())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = %status, url = %response.url().path(), "Spotify API response");
        if status.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, RemoteError> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), RemoteError> {
        self.send(builder).await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Map a non-success response to the remote error taxonomy.
async fn error_from_response(response: Response) -> RemoteError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&text)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| text.chars().take(200).collect::<String>());

    classify_status(status, message, retry_after)
}

pub(crate) fn classify_status(
    status: StatusCode,
    message: String,
    retry_after: Option<u64>,
) -> RemoteError {
    match status {
        StatusCode::UNAUTHORIZED => RemoteError::Unauthorized(message),
        StatusCode::NOT_FOUND => RemoteError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited { retry_after },
        _ => RemoteError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl SpotifyApi for WebApiClient {
    async fn search(
        &self,
        query: &str,
        search_type: SearchType,
        limit: u32,
    ) -> Result<SearchResults, RemoteError> {
        let limit = limit.to_string();
        let builder = self.request(Method::GET, "/search").query(&[
            ("q", query),
            ("type", search_type.as_str()),
            ("limit", limit.as_str()),
        ]);
        self.get_json(builder).await
    }

    async fn start_playback(&self, uris: Option<Vec<String>>) -> Result<(), RemoteError> {
        let builder = self.request(Method::PUT, "/me/player/play");
        let builder = match uris {
            Some(uris) => builder.json(&serde_json::json!({ "uris": uris })),
            None => builder.header(reqwest::header::CONTENT_LENGTH, 0),
        };
        self.send_empty(builder).await
    }

    async fn pause_playback(&self) -> Result<(), RemoteError> {
        let builder = self
            .request(Method::PUT, "/me/player/pause")
            .header(reqwest::header::CONTENT_LENGTH, 0);
        self.send_empty(builder).await
    }

    async fn next_track(&self) -> Result<(), RemoteError> {
        let builder = self
            .request(Method::POST, "/me/player/next")
            .header(reqwest::header::CONTENT_LENGTH, 0);
        self.send_empty(builder).await
    }

    async fn previous_track(&self) -> Result<(), RemoteError> {
        let builder = self
            .request(Method::POST, "/me/player/previous")
            .header(reqwest::header::CONTENT_LENGTH, 0);
        self.send_empty(builder).await
    }

    async fn set_volume(&self, volume_percent: u8) -> Result<(), RemoteError> {
        let builder = self
            .request(Method::PUT, "/me/player/volume")
            .query(&[("volume_percent", volume_percent.to_string())])
            .header(reqwest::header::CONTENT_LENGTH, 0);
        self.send_empty(builder).await
    }

    async fn current_playback(&self) -> Result<Option<PlaybackState>, RemoteError> {
        let response = self.send(self.request(Method::GET, "/me/player")).await?;
        // 204 means no active device
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn current_user(&self) -> Result<UserProfile, RemoteError> {
        self.get_json(self.request(Method::GET, "/me")).await
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<Playlist, RemoteError> {
        let builder = self
            .request(Method::POST, &format!("/users/{}/playlists", user_id))
            .json(&serde_json::json!({ "name": name, "public": public }));
        self.get_json(builder).await
    }

    async fn current_user_playlists(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Playlist>, RemoteError> {
        let builder = self
            .request(Method::GET, "/me/playlists")
            .query(&[("limit", limit), ("offset", offset)]);
        self.get_json(builder).await
    }

    async fn add_items_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), RemoteError> {
        let builder = self
            .request(Method::POST, &format!("/playlists/{}/tracks", playlist_id))
            .json(&serde_json::json!({ "uris": uris }));
        self.send_empty(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, "expired".into(), None),
            RemoteError::Unauthorized("expired".into())
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, "no device".into(), None),
            RemoteError::NotFound("no device".into())
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, String::new(), Some(5)),
            RemoteError::RateLimited {
                retry_after: Some(5)
            }
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, "Premium required".into(), None),
            RemoteError::Api {
                status: 403,
                message: "Premium required".into()
            }
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = WebApiClient::with_base_url(reqwest::Client::new(), "http://x/v1/", "t");
        assert_eq!(client.base_url, "http://x/v1");
    }
}
