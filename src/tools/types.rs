use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ToolError;
use crate::spotify::SearchType;

/// One invocation: a tool name plus its raw arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
        }
    }

    pub fn arg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.to_string(), value.into());
        self
    }
}

/// The single logical outcome of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub segments: Vec<String>,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            segments: vec![text.into()],
            is_error: false,
        }
    }

    /// A failure outcome. Callers pass the text including its `❌` marker.
    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            segments: vec![text.into()],
            is_error: true,
        }
    }

    /// All segments joined with newlines.
    pub fn text(&self) -> String {
        self.segments.join("\n")
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        ToolResult::failure(format!("❌ {}", err))
    }
}

fn default_public() -> bool {
    true
}

fn default_limit() -> u32 {
    super::catalog::DEFAULT_SEARCH_LIMIT as u32
}

/// Validated, typed form of every tool except `authenticate_spotify`.
///
/// Built from a normalized argument map tagged with the tool name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolCall {
    PlaySong {
        song_title: String,
        #[serde(default)]
        artist: Option<String>,
    },
    PausePlayback,
    ResumePlayback,
    SkipTrack,
    PreviousTrack,
    SetVolume {
        volume_percent: u8,
    },
    CreatePlaylist {
        playlist_name: String,
        #[serde(default = "default_public")]
        public: bool,
    },
    AddToPlaylist {
        song_title: String,
        playlist_name: String,
        #[serde(default)]
        artist: Option<String>,
    },
    GetCurrentPlaybackInfo,
    SearchSongs {
        query: String,
        #[serde(default)]
        search_type: SearchType,
        #[serde(default = "default_limit")]
        limit: u32,
    },
    GetUserPlaylists,
}

impl ToolCall {
    /// Phrase used in `❌ Error <context>: ...` outcomes.
    pub fn error_context(&self) -> &'static str {
        match self {
            ToolCall::PlaySong { .. } => "playing song",
            ToolCall::PausePlayback => "pausing",
            ToolCall::ResumePlayback => "resuming",
            ToolCall::SkipTrack => "skipping",
            ToolCall::PreviousTrack => "going to previous track",
            ToolCall::SetVolume { .. } => "setting volume",
            ToolCall::CreatePlaylist { .. } => "creating playlist",
            ToolCall::AddToPlaylist { .. } => "adding to playlist",
            ToolCall::GetCurrentPlaybackInfo => "getting playback info",
            ToolCall::SearchSongs { .. } => "searching",
            ToolCall::GetUserPlaylists => "getting playlists",
        }
    }
}

/// Search query for a title with an optional artist filter.
pub fn track_query(song_title: &str, artist: Option<&str>) -> String {
    match artist {
        Some(artist) => format!("{} artist:{}", song_title, artist),
        None => song_title.to_string(),
    }
}
