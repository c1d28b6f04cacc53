//! Deterministic in-memory adapters.
//!
//! `StubSpotifyApi` serves a fixed catalog and records every call so callers
//! can assert on exactly which remote operations ran. `StubConnector` issues
//! fixed tokens and hands out the shared stub.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::auth::{Connector, TokenInfo};
use crate::config::SCOPES;
use crate::error::{AuthError, RemoteError};

use super::models::{
    Album, Artist, Page, PlaybackState, Playlist, PlaylistOwner, SearchResults, SearchType,
    TrackCount, Track, UserProfile,
};
use super::SpotifyApi;

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubCall {
    Search {
        query: String,
        search_type: SearchType,
        limit: u32,
    },
    StartPlayback(Option<Vec<String>>),
    PausePlayback,
    NextTrack,
    PreviousTrack,
    SetVolume(u8),
    CurrentPlayback,
    CurrentUser,
    CreatePlaylist {
        user_id: String,
        name: String,
        public: bool,
    },
    CurrentUserPlaylists {
        limit: u32,
        offset: u32,
    },
    AddItemsToPlaylist {
        playlist_id: String,
        uris: Vec<String>,
    },
}

impl StubCall {
    /// Operation name, matching the `SpotifyApi` method.
    pub fn operation(&self) -> &'static str {
        match self {
            StubCall::Search { .. } => "search",
            StubCall::StartPlayback(_) => "start_playback",
            StubCall::PausePlayback => "pause_playback",
            StubCall::NextTrack => "next_track",
            StubCall::PreviousTrack => "previous_track",
            StubCall::SetVolume(_) => "set_volume",
            StubCall::CurrentPlayback => "current_playback",
            StubCall::CurrentUser => "current_user",
            StubCall::CreatePlaylist { .. } => "create_playlist",
            StubCall::CurrentUserPlaylists { .. } => "current_user_playlists",
            StubCall::AddItemsToPlaylist { .. } => "add_items_to_playlist",
        }
    }
}

#[derive(Default)]
struct StubState {
    user: Option<UserProfile>,
    tracks: Vec<Track>,
    artists: Vec<Artist>,
    albums: Vec<Album>,
    playlists: Vec<Playlist>,
    playback: Option<PlaybackState>,
    failures: HashMap<&'static str, RemoteError>,
    calls: Vec<StubCall>,
    created: u32,
}

/// In-memory `SpotifyApi`.
#[derive(Default)]
pub struct StubSpotifyApi {
    state: Mutex<StubState>,
}

impl StubSpotifyApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: &str, display_name: Option<&str>) -> Self {
        self.lock().user = Some(UserProfile {
            id: id.to_string(),
            display_name: display_name.map(str::to_string),
        });
        self
    }

    pub fn with_tracks(self, tracks: Vec<Track>) -> Self {
        self.lock().tracks = tracks;
        self
    }

    pub fn with_artists(self, artists: Vec<Artist>) -> Self {
        self.lock().artists = artists;
        self
    }

    pub fn with_albums(self, albums: Vec<Album>) -> Self {
        self.lock().albums = albums;
        self
    }

    pub fn with_playlists(self, playlists: Vec<Playlist>) -> Self {
        self.lock().playlists = playlists;
        self
    }

    pub fn with_playback(self, playback: PlaybackState) -> Self {
        self.lock().playback = Some(playback);
        self
    }

    /// Make `operation` fail with `error` until cleared.
    pub fn failing(self, operation: &'static str, error: RemoteError) -> Self {
        self.fail(operation, error);
        self
    }

    pub fn fail(&self, operation: &'static str, error: RemoteError) {
        self.lock().failures.insert(operation, error);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn set_playback(&self, playback: Option<PlaybackState>) {
        self.lock().playback = playback;
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<StubCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls to the named operation.
    pub fn count_of(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    pub fn playlists(&self) -> Vec<Playlist> {
        self.lock().playlists.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        // a panicking test thread must not wedge the others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `call` and return the configured failure for it, if any.
    fn record(&self, call: StubCall) -> Result<MutexGuard<'_, StubState>, RemoteError> {
        let mut state = self.lock();
        let operation = call.operation();
        state.calls.push(call);
        let failure = state.failures.get(operation).cloned();
        match failure {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

/// Split `"title artist:name"` into its primary term and artist filter.
fn parse_query(query: &str) -> (String, Option<String>) {
    match query.split_once(" artist:") {
        Some((title, artist)) => (title.trim().to_lowercase(), Some(artist.trim().to_lowercase())),
        None => (query.trim().to_lowercase(), None),
    }
}

fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(term)
}

#[async_trait]
impl SpotifyApi for StubSpotifyApi {
    async fn search(
        &self,
        query: &str,
        search_type: SearchType,
        limit: u32,
    ) -> Result<SearchResults, RemoteError> {
        let state = self.record(StubCall::Search {
            query: query.to_string(),
            search_type,
            limit,
        })?;
        let (term, artist) = parse_query(query);
        let take = limit as usize;

        let mut results = SearchResults::default();
        match search_type {
            SearchType::Track => {
                let items = state
                    .tracks
                    .iter()
                    .filter(|t| name_matches(&t.name, &term))
                    .filter(|t| match &artist {
                        Some(a) => t.artists.iter().any(|x| name_matches(&x.name, a)),
                        None => true,
                    })
                    .take(take)
                    .cloned()
                    .collect();
                results.tracks = Some(Page::single(items));
            }
            SearchType::Artist => {
                let items = state
                    .artists
                    .iter()
                    .filter(|a| name_matches(&a.name, &term))
                    .take(take)
                    .cloned()
                    .collect();
                results.artists = Some(Page::single(items));
            }
            SearchType::Album => {
                let items = state
                    .albums
                    .iter()
                    .filter(|a| name_matches(&a.name, &term))
                    .take(take)
                    .cloned()
                    .collect();
                results.albums = Some(Page::single(items));
            }
            SearchType::Playlist => {
                let items = state
                    .playlists
                    .iter()
                    .filter(|p| name_matches(&p.name, &term))
                    .take(take)
                    .cloned()
                    .map(Some)
                    .collect();
                results.playlists = Some(Page::single(items));
            }
        }
        Ok(results)
    }

    async fn start_playback(&self, uris: Option<Vec<String>>) -> Result<(), RemoteError> {
        let mut state = self.record(StubCall::StartPlayback(uris.clone()))?;
        let track = uris
            .as_ref()
            .and_then(|u| u.first())
            .and_then(|uri| state.tracks.iter().find(|t| &t.uri == uri).cloned());
        if let Some(playback) = state.playback.as_mut() {
            playback.is_playing = true;
            if track.is_some() {
                playback.item = track;
                playback.progress_ms = Some(0);
            }
        }
        Ok(())
    }

    async fn pause_playback(&self) -> Result<(), RemoteError> {
        let mut state = self.record(StubCall::PausePlayback)?;
        if let Some(playback) = state.playback.as_mut() {
            playback.is_playing = false;
        }
        Ok(())
    }

    async fn next_track(&self) -> Result<(), RemoteError> {
        self.record(StubCall::NextTrack).map(|_| ())
    }

    async fn previous_track(&self) -> Result<(), RemoteError> {
        self.record(StubCall::PreviousTrack).map(|_| ())
    }

    async fn set_volume(&self, volume_percent: u8) -> Result<(), RemoteError> {
        let mut state = self.record(StubCall::SetVolume(volume_percent))?;
        if let Some(device) = state.playback.as_mut().and_then(|p| p.device.as_mut()) {
            device.volume_percent = Some(volume_percent);
        }
        Ok(())
    }

    async fn current_playback(&self) -> Result<Option<PlaybackState>, RemoteError> {
        let state = self.record(StubCall::CurrentPlayback)?;
        Ok(state.playback.clone())
    }

    async fn current_user(&self) -> Result<UserProfile, RemoteError> {
        let state = self.record(StubCall::CurrentUser)?;
        state
            .user
            .clone()
            .ok_or_else(|| RemoteError::NotFound("no user profile".to_string()))
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<Playlist, RemoteError> {
        let mut state = self.record(StubCall::CreatePlaylist {
            user_id: user_id.to_string(),
            name: name.to_string(),
            public,
        })?;
        state.created += 1;
        let playlist = Playlist {
            id: format!("stub-playlist-{}", state.created),
            name: name.to_string(),
            public: Some(public),
            description: None,
            tracks: Some(TrackCount { total: 0 }),
            owner: Some(PlaylistOwner {
                id: user_id.to_string(),
                display_name: None,
            }),
        };
        state.playlists.push(playlist.clone());
        Ok(playlist)
    }

    async fn current_user_playlists(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Playlist>, RemoteError> {
        let state = self.record(StubCall::CurrentUserPlaylists { limit, offset })?;
        let total = state.playlists.len();
        let start = (offset as usize).min(total);
        let end = (start + limit as usize).min(total);
        let next = (end < total).then(|| format!("offset={}", end));
        Ok(Page {
            items: state.playlists[start..end].to_vec(),
            next,
            total: total as u32,
        })
    }

    async fn add_items_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), RemoteError> {
        let mut state = self.record(StubCall::AddItemsToPlaylist {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
        })?;
        match state.playlists.iter_mut().find(|p| p.id == playlist_id) {
            Some(playlist) => {
                let count = playlist.tracks.get_or_insert_with(TrackCount::default);
                count.total += uris.len() as u32;
                Ok(())
            }
            None => Err(RemoteError::NotFound(format!(
                "playlist {} does not exist",
                playlist_id
            ))),
        }
    }
}

/// Token endpoint stand-in.
///
/// Accepts any code except those registered as rejected, issues tokens that
/// cover every requested scope, and connects every token to the same stub.
pub struct StubConnector {
    api: Arc<StubSpotifyApi>,
    rejected: Mutex<Vec<String>>,
    exchanges: Mutex<Vec<String>>,
    refreshes: Mutex<Vec<String>>,
    refresh_fails: bool,
}

impl StubConnector {
    pub fn new(api: Arc<StubSpotifyApi>) -> Self {
        Self {
            api,
            rejected: Mutex::new(Vec::new()),
            exchanges: Mutex::new(Vec::new()),
            refreshes: Mutex::new(Vec::new()),
            refresh_fails: false,
        }
    }

    /// Reject `code` with `invalid_grant`.
    pub fn rejecting(self, code: &str) -> Self {
        self.rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(code.to_string());
        self
    }

    pub fn with_failing_refresh(mut self) -> Self {
        self.refresh_fails = true;
        self
    }

    pub fn api(&self) -> Arc<StubSpotifyApi> {
        Arc::clone(&self.api)
    }

    /// Codes exchanged so far.
    pub fn exchanges(&self) -> Vec<String> {
        self.exchanges
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Token as the stub issues it.
    pub fn token_for(code: &str) -> TokenInfo {
        TokenInfo::issued_now(
            format!("access-{}", code),
            3600,
            SCOPES.join(" "),
            Some(format!("refresh-{}", code)),
        )
    }
}

#[async_trait]
impl Connector for StubConnector {
    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, AuthError> {
        self.exchanges
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(code.to_string());
        let rejected = self
            .rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|c| c == code);
        if rejected {
            return Err(AuthError::ExchangeRejected("invalid_grant".to_string()));
        }
        Ok(Self::token_for(code))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenInfo, AuthError> {
        self.refreshes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(refresh_token.to_string());
        if self.refresh_fails {
            return Err(AuthError::ExchangeRejected("invalid_grant".to_string()));
        }
        Ok(TokenInfo::issued_now("access-refreshed", 3600, SCOPES.join(" "), None)
            .inherit_refresh_token(Some(refresh_token)))
    }

    fn connect(&self, _token: &TokenInfo) -> Arc<dyn SpotifyApi> {
        self.api.clone()
    }
}
