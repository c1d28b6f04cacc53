//! Wire models for the subset of the Spotify Web API the tools consume.
//!
//! Fields the tools never read are omitted; optional fields default so that
//! partially populated objects (local files, podcast episodes) still decode.

use serde::{Deserialize, Serialize};

/// Which catalog a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Track,
    Artist,
    Album,
    Playlist,
}

impl SearchType {
    pub const ALL: &'static [&'static str] = &["track", "artist", "album", "playlist"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Track => "track",
            SearchType::Artist => "artist",
            SearchType::Album => "album",
            SearchType::Playlist => "playlist",
        }
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of a paginated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next: None,
            total: 0,
        }
    }
}

impl<T> Page<T> {
    pub fn single(items: Vec<T>) -> Self {
        let total = items.len() as u32;
        Self {
            items,
            next: None,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub duration_ms: u64,
}

impl Track {
    /// Comma-joined artist names.
    pub fn artist_names(&self) -> String {
        join_artists(&self.artists)
    }

    pub fn album_name(&self) -> &str {
        self.album.as_ref().map(|a| a.name.as_str()).unwrap_or("Unknown")
    }
}

pub fn join_artists(artists: &[ArtistRef]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(default)]
    pub followers: Option<Followers>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackCount {
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tracks: Option<TrackCount>,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
}

impl Playlist {
    pub fn track_count(&self) -> u32 {
        self.tracks.as_ref().map(|t| t.total).unwrap_or(0)
    }
}

/// Search response. Only the section matching the requested type is filled.
///
/// Playlist search results can contain `null` entries, hence the `Option`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub tracks: Option<Page<Track>>,
    #[serde(default)]
    pub artists: Option<Page<Artist>>,
    #[serde(default)]
    pub albums: Option<Page<Album>>,
    #[serde(default)]
    pub playlists: Option<Page<Option<Playlist>>>,
}

impl SearchResults {
    pub fn first_track(&self) -> Option<&Track> {
        self.tracks.as_ref().and_then(|p| p.items.first())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub volume_percent: Option<u8>,
}

/// `GET /me/player` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default)]
    pub shuffle_state: bool,
    #[serde(default = "default_repeat_state")]
    pub repeat_state: String,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub item: Option<Track>,
}

fn default_repeat_state() -> String {
    "off".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
