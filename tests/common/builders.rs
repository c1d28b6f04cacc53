//! Fixture builders for the stub catalog.

use spotify_mcp::spotify::models::{AlbumRef, PlaylistOwner, TrackCount};
use spotify_mcp::spotify::{ArtistRef, Device, PlaybackState, Playlist, StubSpotifyApi, Track};

pub fn track(name: &str, artist: &str) -> Track {
    Track {
        name: name.to_string(),
        uri: format!(
            "spotify:track:{}-{}",
            name.to_lowercase().replace(' ', "-"),
            artist.to_lowercase().replace(' ', "-")
        ),
        artists: vec![ArtistRef {
            name: artist.to_string(),
        }],
        album: Some(AlbumRef {
            name: format!("{} (Single)", name),
        }),
        duration_ms: 215_000,
    }
}

pub fn playlist(id: &str, name: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        public: Some(false),
        description: None,
        tracks: Some(TrackCount { total: 0 }),
        owner: Some(PlaylistOwner {
            id: "listener".to_string(),
            display_name: Some("Listener".to_string()),
        }),
    }
}

pub fn playing(item: Track) -> PlaybackState {
    PlaybackState {
        device: Some(Device {
            name: Some("Kitchen Speaker".to_string()),
            volume_percent: Some(40),
        }),
        shuffle_state: false,
        repeat_state: "off".to_string(),
        progress_ms: Some(65_000),
        is_playing: true,
        item: Some(item),
    }
}

/// A listener with a small library and something playing.
pub fn sample_api() -> StubSpotifyApi {
    StubSpotifyApi::new()
        .with_user("listener", Some("Listener"))
        .with_tracks(vec![
            track("Hey Jude", "The Beatles"),
            track("Hello", "Adele"),
            track("Hello", "Lionel Richie"),
            track("Holocene", "Bon Iver"),
        ])
        .with_playlists(vec![
            playlist("pl-focus", "Focus"),
            playlist("pl-road", "Road Trip"),
        ])
        .with_playback(playing(track("Holocene", "Bon Iver")))
}
