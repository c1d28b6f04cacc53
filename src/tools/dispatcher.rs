use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::catalog::{self, ToolDescriptor, AUTHENTICATE};
use super::error::ToolError;
use super::format;
use super::types::{track_query, ToolCall, ToolRequest, ToolResult};
use super::validate::validate;
use crate::auth::AuthManager;
use crate::error::{RemoteError, ValidationError};
use crate::spotify::{Playlist, SearchType, SpotifyApi, Track, PLAYLIST_PAGE_SIZE};

/// Pause between a skip and the read of the new current track.
pub const DEFAULT_FOLLOW_UP_DELAY: Duration = Duration::from_secs(1);

/// Routes tool requests to the remote API through the current session.
#[derive(Clone)]
pub struct ToolDispatcher {
    auth: AuthManager,
    follow_up_delay: Duration,
}

impl ToolDispatcher {
    pub fn new(auth: AuthManager) -> Self {
        Self {
            auth,
            follow_up_delay: DEFAULT_FOLLOW_UP_DELAY,
        }
    }

    pub fn with_follow_up_delay(mut self, delay: Duration) -> Self {
        self.follow_up_delay = delay;
        self
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    pub fn list_tools(&self) -> &'static [ToolDescriptor] {
        catalog::list_tools()
    }

    /// Run one request. Every failure is folded into the returned outcome.
    #[instrument(name = "tool.invoke", skip_all, fields(tool = %request.name))]
    pub async fn invoke(&self, request: ToolRequest) -> ToolResult {
        match self.try_invoke(&request).await {
            Ok(result) => {
                debug!(is_error = result.is_error, "Tool completed");
                result
            }
            Err(err) => {
                warn!(error_code = err.error_code(), error = %err, "Tool failed");
                err.into()
            }
        }
    }

    async fn try_invoke(&self, request: &ToolRequest) -> Result<ToolResult, ToolError> {
        let descriptor = catalog::find(&request.name)
            .ok_or_else(|| ToolError::UnknownTool(request.name.clone()))?;

        if descriptor.name == AUTHENTICATE {
            let outcome = self.auth.authenticate().await?;
            return Ok(ToolResult::success(outcome.to_string()));
        }

        let session = self
            .auth
            .current_session()
            .ok_or(ToolError::NotAuthenticated)?;

        let mut args = validate(descriptor, &request.arguments)?;
        args.insert("tool".to_string(), Value::from(descriptor.name));
        let call: ToolCall = serde_json::from_value(Value::Object(args))
            .map_err(|e| ValidationError::new("arguments", e.to_string()))?;

        info!(tool = descriptor.name, "Invoking tool");
        self.execute(session.client().as_ref(), call).await
    }

    async fn execute(&self, api: &dyn SpotifyApi, call: ToolCall) -> Result<ToolResult, ToolError> {
        let ctx = call.error_context();
        match call {
            ToolCall::PlaySong { song_title, artist } => {
                let query = track_query(&song_title, artist.as_deref());
                let results = api
                    .search(&query, SearchType::Track, 1)
                    .await
                    .map_err(ToolError::remote(ctx))?;
                let Some(track) = results.first_track() else {
                    return Ok(ToolResult::failure(format::no_tracks_found(
                        &song_title,
                        artist.as_deref(),
                    )));
                };
                api.start_playback(Some(vec![track.uri.clone()]))
                    .await
                    .map_err(ToolError::remote(ctx))?;
                Ok(ToolResult::success(format::now_playing(track)))
            }
            ToolCall::PausePlayback => {
                api.pause_playback().await.map_err(ToolError::remote(ctx))?;
                Ok(ToolResult::success("⏸️ Playback paused"))
            }
            ToolCall::ResumePlayback => {
                api.start_playback(None)
                    .await
                    .map_err(ToolError::remote(ctx))?;
                Ok(ToolResult::success("▶️ Playback resumed"))
            }
            ToolCall::SkipTrack => {
                api.next_track().await.map_err(ToolError::remote(ctx))?;
                let now = self.now_playing_after_change(api).await;
                Ok(ToolResult::success(format::skipped(now.as_ref())))
            }
            ToolCall::PreviousTrack => {
                api.previous_track().await.map_err(ToolError::remote(ctx))?;
                let now = self.now_playing_after_change(api).await;
                Ok(ToolResult::success(format::went_back(now.as_ref())))
            }
            ToolCall::SetVolume { volume_percent } => {
                api.set_volume(volume_percent)
                    .await
                    .map_err(ToolError::remote(ctx))?;
                Ok(ToolResult::success(format::volume_set(volume_percent)))
            }
            ToolCall::CreatePlaylist {
                playlist_name,
                public,
            } => {
                let user = api.current_user().await.map_err(ToolError::remote(ctx))?;
                let playlist = api
                    .create_playlist(&user.id, &playlist_name, public)
                    .await
                    .map_err(ToolError::remote(ctx))?;
                Ok(ToolResult::success(format::playlist_created(
                    &playlist_name,
                    &playlist.id,
                    public,
                )))
            }
            ToolCall::AddToPlaylist {
                song_title,
                playlist_name,
                artist,
            } => {
                let Some(playlist) = find_playlist(api, &playlist_name)
                    .await
                    .map_err(ToolError::remote(ctx))?
                else {
                    return Ok(ToolResult::failure(format!(
                        "❌ Playlist '{}' not found",
                        playlist_name
                    )));
                };

                let query = track_query(&song_title, artist.as_deref());
                let results = api
                    .search(&query, SearchType::Track, 1)
                    .await
                    .map_err(ToolError::remote(ctx))?;
                let Some(track) = results.first_track() else {
                    return Ok(ToolResult::failure(format!(
                        "❌ Song '{}' not found",
                        song_title
                    )));
                };

                api.add_items_to_playlist(&playlist.id, std::slice::from_ref(&track.uri))
                    .await
                    .map_err(ToolError::remote(ctx))?;
                Ok(ToolResult::success(format::added_to_playlist(
                    track,
                    &playlist_name,
                )))
            }
            ToolCall::GetCurrentPlaybackInfo => {
                let Some(state) = api
                    .current_playback()
                    .await
                    .map_err(ToolError::remote(ctx))?
                else {
                    return Ok(ToolResult::success("🔇 No active playback"));
                };
                Ok(ToolResult::success(
                    format::playback_info(&state)
                        .unwrap_or_else(|| "🔇 No track currently playing".to_string()),
                ))
            }
            ToolCall::SearchSongs {
                query,
                search_type,
                limit,
            } => {
                let results = api
                    .search(&query, search_type, limit)
                    .await
                    .map_err(ToolError::remote(ctx))?;
                Ok(match format::search_results(&query, search_type, &results) {
                    Some(text) => ToolResult::success(text),
                    None => ToolResult::failure(format::no_search_results(&query, search_type)),
                })
            }
            ToolCall::GetUserPlaylists => {
                let playlists = all_playlists(api).await.map_err(ToolError::remote(ctx))?;
                Ok(ToolResult::success(
                    format::playlists(&playlists)
                        .unwrap_or_else(|| "📁 No playlists found".to_string()),
                ))
            }
        }
    }

    /// Wait, then read what is playing now. A failed read counts as nothing.
    async fn now_playing_after_change(&self, api: &dyn SpotifyApi) -> Option<Track> {
        if !self.follow_up_delay.is_zero() {
            tokio::time::sleep(self.follow_up_delay).await;
        }
        match api.current_playback().await {
            Ok(state) => state.and_then(|s| s.item),
            Err(e) => {
                debug!(error = %e, "Follow-up playback read failed");
                None
            }
        }
    }
}

/// Case-insensitive exact lookup over every page of the user's playlists.
/// First match wins.
async fn find_playlist(api: &dyn SpotifyApi, name: &str) -> Result<Option<Playlist>, RemoteError> {
    let wanted = name.to_lowercase();
    let mut offset = 0;
    loop {
        let page = api.current_user_playlists(PLAYLIST_PAGE_SIZE, offset).await?;
        let fetched = page.items.len() as u32;
        if let Some(found) = page.items.into_iter().find(|p| p.name.to_lowercase() == wanted) {
            return Ok(Some(found));
        }
        if page.next.is_none() || fetched == 0 {
            return Ok(None);
        }
        offset += fetched;
    }
}

async fn all_playlists(api: &dyn SpotifyApi) -> Result<Vec<Playlist>, RemoteError> {
    let mut playlists = Vec::new();
    let mut offset = 0;
    loop {
        let page = api.current_user_playlists(PLAYLIST_PAGE_SIZE, offset).await?;
        let fetched = page.items.len() as u32;
        playlists.extend(page.items);
        if page.next.is_none() || fetched == 0 {
            return Ok(playlists);
        }
        offset += fetched;
    }
}
