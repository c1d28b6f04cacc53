//! Remote Spotify capabilities.
//!
//! The `SpotifyApi` trait is the narrow capability set the tools need
//! (search, playback control, playlist CRUD, profile read). `WebApiClient`
//! implements it over HTTP; `StubSpotifyApi` is a deterministic in-memory
//! implementation that records every call.

pub mod accounts;
pub mod client;
pub mod models;
pub mod stub;

use async_trait::async_trait;

use crate::error::RemoteError;

pub use accounts::AccountsClient;
pub use client::WebApiClient;
pub use models::{
    Album, Artist, ArtistRef, Device, Page, PlaybackState, Playlist, SearchResults, SearchType,
    Track, UserProfile,
};
pub use stub::{StubConnector, StubSpotifyApi};

/// Page size used when walking the user's playlists.
pub const PLAYLIST_PAGE_SIZE: u32 = 50;

/// Authenticated client handle for one account.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Catalog search. `limit` is already clamped by the caller.
    async fn search(
        &self,
        query: &str,
        search_type: SearchType,
        limit: u32,
    ) -> Result<SearchResults, RemoteError>;

    /// Start playback of `uris`, or resume the current context when `None`.
    async fn start_playback(&self, uris: Option<Vec<String>>) -> Result<(), RemoteError>;

    async fn pause_playback(&self) -> Result<(), RemoteError>;

    async fn next_track(&self) -> Result<(), RemoteError>;

    async fn previous_track(&self) -> Result<(), RemoteError>;

    async fn set_volume(&self, volume_percent: u8) -> Result<(), RemoteError>;

    /// Current playback state; `None` when nothing is active.
    async fn current_playback(&self) -> Result<Option<PlaybackState>, RemoteError>;

    async fn current_user(&self) -> Result<UserProfile, RemoteError>;

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<Playlist, RemoteError>;

    /// One page of the current user's playlists.
    async fn current_user_playlists(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Playlist>, RemoteError>;

    async fn add_items_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), RemoteError>;
}
