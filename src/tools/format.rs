//! Text outcomes for successful (or empty) remote responses.

use std::fmt::Write as _;

use crate::spotify::models::{join_artists, PlaybackState, Playlist, SearchResults, SearchType, Track};
use crate::utils::format::{format_duration_ms, thousands, title_case};

pub fn now_playing(track: &Track) -> String {
    format!("🎵 Now playing: {} by {}", track.name, track.artist_names())
}

pub fn no_tracks_found(song_title: &str, artist: Option<&str>) -> String {
    match artist {
        Some(artist) => format!("❌ No tracks found for '{}' by {}", song_title, artist),
        None => format!("❌ No tracks found for '{}'", song_title),
    }
}

pub fn skipped(now: Option<&Track>) -> String {
    match now {
        Some(t) => format!("⏭️ Skipped to: {} by {}", t.name, t.artist_names()),
        None => "⏭️ Skipped to next track".to_string(),
    }
}

pub fn went_back(now: Option<&Track>) -> String {
    match now {
        Some(t) => format!("⏮️ Previous track: {} by {}", t.name, t.artist_names()),
        None => "⏮️ Went to previous track".to_string(),
    }
}

pub fn volume_set(volume_percent: u8) -> String {
    format!("🔊 Volume set to {}%", volume_percent)
}

pub fn playlist_created(name: &str, id: &str, public: bool) -> String {
    format!(
        "✅ Created {} playlist: {}\nPlaylist ID: {}",
        if public { "public" } else { "private" },
        name,
        id
    )
}

pub fn added_to_playlist(track: &Track, playlist_name: &str) -> String {
    format!(
        "✅ Added '{}' by {} to playlist '{}'",
        track.name,
        track.artist_names(),
        playlist_name
    )
}

/// Playback summary, or `None` when no track is loaded.
pub fn playback_info(state: &PlaybackState) -> Option<String> {
    let track = state.item.as_ref()?;
    let progress = format_duration_ms(state.progress_ms.unwrap_or(0));
    let duration = format_duration_ms(track.duration_ms);
    let volume = state
        .device
        .as_ref()
        .and_then(|d| d.volume_percent)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let device = state
        .device
        .as_ref()
        .and_then(|d| d.name.as_deref())
        .unwrap_or("Unknown");

    Some(format!(
        "🎵 **Currently {}:**\n\
         **Track:** {}\n\
         **Artist:** {}\n\
         **Album:** {}\n\
         **Progress:** {} / {}\n\
         **Volume:** {}%\n\
         **Device:** {}\n\
         **Shuffle:** {}\n\
         **Repeat:** {}",
        if state.is_playing { "Playing" } else { "Paused" },
        track.name,
        track.artist_names(),
        track.album_name(),
        progress,
        duration,
        volume,
        device,
        if state.shuffle_state { "On" } else { "Off" },
        title_case(&state.repeat_state),
    ))
}

/// Search listing for `search_type`; `None` when the section is empty.
pub fn search_results(query: &str, search_type: SearchType, results: &SearchResults) -> Option<String> {
    let mut out = String::new();
    match search_type {
        SearchType::Track => {
            let items = results.tracks.as_ref().map(|p| &p.items[..]).unwrap_or(&[]);
            if items.is_empty() {
                return None;
            }
            let _ = write!(out, "🔍 **Found {} track(s) for '{}':**\n\n", items.len(), query);
            for (i, track) in items.iter().enumerate() {
                let _ = writeln!(out, "{}. **{}** by {}", i + 1, track.name, track.artist_names());
                let _ = write!(out, "   Album: {}\n\n", track.album_name());
            }
        }
        SearchType::Artist => {
            let items = results.artists.as_ref().map(|p| &p.items[..]).unwrap_or(&[]);
            if items.is_empty() {
                return None;
            }
            let _ = write!(out, "🔍 **Found {} artist(s) for '{}':**\n\n", items.len(), query);
            for (i, artist) in items.iter().enumerate() {
                let followers = artist.followers.as_ref().map(|f| f.total).unwrap_or(0);
                let _ = writeln!(out, "{}. **{}**", i + 1, artist.name);
                let _ = writeln!(out, "   Followers: {}", thousands(followers));
                if !artist.genres.is_empty() {
                    let genres: Vec<&str> = artist.genres.iter().take(3).map(String::as_str).collect();
                    let _ = writeln!(out, "   Genres: {}", genres.join(", "));
                }
                out.push('\n');
            }
        }
        SearchType::Album => {
            let items = results.albums.as_ref().map(|p| &p.items[..]).unwrap_or(&[]);
            if items.is_empty() {
                return None;
            }
            let _ = write!(out, "🔍 **Found {} album(s) for '{}':**\n\n", items.len(), query);
            for (i, album) in items.iter().enumerate() {
                let _ = writeln!(out, "{}. **{}** by {}", i + 1, album.name, join_artists(&album.artists));
                if let Some(date) = &album.release_date {
                    let _ = writeln!(out, "   Released: {}", date);
                }
                if let Some(total) = album.total_tracks {
                    let _ = writeln!(out, "   Tracks: {}", total);
                }
                out.push('\n');
            }
        }
        SearchType::Playlist => {
            let items: Vec<&Playlist> = results
                .playlists
                .as_ref()
                .map(|p| p.items.iter().flatten().collect())
                .unwrap_or_default();
            if items.is_empty() {
                return None;
            }
            let _ = write!(out, "🔍 **Found {} playlist(s) for '{}':**\n\n", items.len(), query);
            for (i, playlist) in items.iter().enumerate() {
                let owner = playlist
                    .owner
                    .as_ref()
                    .map(|o| o.display_name.clone().unwrap_or_else(|| o.id.clone()))
                    .unwrap_or_else(|| "Unknown".to_string());
                let _ = writeln!(out, "{}. **{}** by {}", i + 1, playlist.name, owner);
                let _ = write!(out, "   Tracks: {}\n\n", playlist.track_count());
            }
        }
    }
    Some(out)
}

pub fn no_search_results(query: &str, search_type: SearchType) -> String {
    format!("❌ No {}s found for '{}'", search_type, query)
}

/// Playlist listing; `None` when there are no playlists.
pub fn playlists(playlists: &[Playlist]) -> Option<String> {
    if playlists.is_empty() {
        return None;
    }
    let mut out = format!("📁 **Your Playlists ({}):**\n\n", playlists.len());
    for playlist in playlists {
        let name = if playlist.name.is_empty() { "Unknown" } else { &playlist.name };
        let visibility = if playlist.public.unwrap_or(false) { "Public" } else { "Private" };
        let _ = writeln!(
            out,
            "• **{}** ({} tracks, {})",
            name,
            playlist.track_count(),
            visibility
        );
        if let Some(desc) = playlist.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "  Description: {}", desc);
        }
        out.push('\n');
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::models::{AlbumRef, Artist, ArtistRef, Device, Followers, Page, TrackCount};
    use pretty_assertions::assert_eq;

    fn track() -> Track {
        Track {
            name: "Bohemian Rhapsody".into(),
            uri: "spotify:track:1".into(),
            artists: vec![ArtistRef { name: "Queen".into() }],
            album: Some(AlbumRef {
                name: "A Night at the Opera".into(),
            }),
            duration_ms: 354_947,
        }
    }

    #[test]
    fn test_playback_info_block() {
        let state = PlaybackState {
            device: Some(Device {
                name: Some("Kitchen".into()),
                volume_percent: Some(40),
            }),
            shuffle_state: true,
            repeat_state: "context".into(),
            progress_ms: Some(65_500),
            is_playing: false,
            item: Some(track()),
        };
        assert_eq!(
            playback_info(&state).unwrap(),
            "🎵 **Currently Paused:**\n\
             **Track:** Bohemian Rhapsody\n\
             **Artist:** Queen\n\
             **Album:** A Night at the Opera\n\
             **Progress:** 1:05 / 5:54\n\
             **Volume:** 40%\n\
             **Device:** Kitchen\n\
             **Shuffle:** On\n\
             **Repeat:** Context"
        );
    }

    #[test]
    fn test_playback_info_unknown_device() {
        let state = PlaybackState {
            device: None,
            shuffle_state: false,
            repeat_state: "off".into(),
            progress_ms: None,
            is_playing: true,
            item: Some(track()),
        };
        let text = playback_info(&state).unwrap();
        assert!(text.contains("**Volume:** Unknown%"));
        assert!(text.contains("**Device:** Unknown"));
        assert!(text.contains("**Progress:** 0:00 / 5:54"));
    }

    #[test]
    fn test_artist_search_listing() {
        let results = SearchResults {
            artists: Some(Page::single(vec![Artist {
                name: "Queen".into(),
                followers: Some(Followers { total: 51_234_567 }),
                genres: vec!["rock".into(), "glam rock".into(), "classic rock".into(), "opera".into()],
            }])),
            ..Default::default()
        };
        assert_eq!(
            search_results("queen", SearchType::Artist, &results).unwrap(),
            "🔍 **Found 1 artist(s) for 'queen':**\n\n\
             1. **Queen**\n   Followers: 51,234,567\n   Genres: rock, glam rock, classic rock\n\n"
        );
    }

    #[test]
    fn test_track_search_listing() {
        let results = SearchResults {
            tracks: Some(Page::single(vec![track()])),
            ..Default::default()
        };
        assert_eq!(
            search_results("bohemian", SearchType::Track, &results).unwrap(),
            "🔍 **Found 1 track(s) for 'bohemian':**\n\n\
             1. **Bohemian Rhapsody** by Queen\n   Album: A Night at the Opera\n\n"
        );
    }

    #[test]
    fn test_empty_search() {
        let results = SearchResults::default();
        assert!(search_results("x", SearchType::Album, &results).is_none());
        assert_eq!(no_search_results("x", SearchType::Album), "❌ No albums found for 'x'");
    }

    #[test]
    fn test_playlists_listing() {
        let lists = vec![
            Playlist {
                id: "1".into(),
                name: "Road Trip".into(),
                public: Some(true),
                description: Some("Driving songs".into()),
                tracks: Some(TrackCount { total: 12 }),
                owner: None,
            },
            Playlist {
                id: "2".into(),
                name: "Focus".into(),
                public: Some(false),
                description: Some(String::new()),
                tracks: None,
                owner: None,
            },
        ];
        assert_eq!(
            playlists(&lists).unwrap(),
            "📁 **Your Playlists (2):**\n\n\
             • **Road Trip** (12 tracks, Public)\n  Description: Driving songs\n\n\
             • **Focus** (0 tracks, Private)\n\n"
        );
        assert!(playlists(&[]).is_none());
    }

    #[test]
    fn test_create_playlist_wording() {
        assert_eq!(
            playlist_created("Test", "abc123", false),
            "✅ Created private playlist: Test\nPlaylist ID: abc123"
        );
    }
}
