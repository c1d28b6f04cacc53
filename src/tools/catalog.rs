//! Static tool catalog.
//!
//! Each descriptor declares its parameters once; the JSON Schema advertised
//! over MCP and the argument validator are both derived from it.

use serde_json::{json, Map, Value};

/// Tool that establishes a session. Always callable.
pub const AUTHENTICATE: &str = "authenticate_spotify";

/// Default and fallback for `search_songs.limit`.
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// What to do with an integer outside its declared range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePolicy {
    Reject,
    /// Substitute the value (also used when the argument is absent or mistyped).
    Fallback(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer {
        min: i64,
        max: i64,
        policy: RangePolicy,
    },
    Boolean {
        default: bool,
    },
    Enum {
        values: &'static [&'static str],
        default: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    const fn required(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
        }
    }

    const fn optional(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
        }
    }

    fn schema(&self) -> Value {
        let mut schema = Map::new();
        match self.kind {
            ParamKind::String => {
                schema.insert("type".into(), json!("string"));
            }
            ParamKind::Integer { min, max, policy } => {
                schema.insert("type".into(), json!("integer"));
                schema.insert("minimum".into(), json!(min));
                schema.insert("maximum".into(), json!(max));
                if let RangePolicy::Fallback(default) = policy {
                    schema.insert("default".into(), json!(default));
                }
            }
            ParamKind::Boolean { default } => {
                schema.insert("type".into(), json!("boolean"));
                schema.insert("default".into(), json!(default));
            }
            ParamKind::Enum { values, default } => {
                schema.insert("type".into(), json!("string"));
                schema.insert("enum".into(), json!(values));
                schema.insert("default".into(), json!(default));
            }
        }
        schema.insert("description".into(), json!(self.description));
        Value::Object(schema)
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolDescriptor {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// JSON Schema object for the tool's arguments.
    pub fn input_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema
    }
}

const ARTIST: ParamSpec = ParamSpec::optional(
    "artist",
    "Artist name (optional for better accuracy)",
    ParamKind::String,
);

pub const SEARCH_TYPES: &[&str] = &["track", "artist", "album", "playlist"];

static CATALOG: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: AUTHENTICATE,
        description: "Authenticate with Spotify (run this first)",
        params: &[],
    },
    ToolDescriptor {
        name: "play_song",
        description: "Play a specific song by title and optional artist",
        params: &[
            ParamSpec::required("song_title", "Title of the song", ParamKind::String),
            ARTIST,
        ],
    },
    ToolDescriptor {
        name: "pause_playback",
        description: "Pause current playback",
        params: &[],
    },
    ToolDescriptor {
        name: "resume_playback",
        description: "Resume paused playback",
        params: &[],
    },
    ToolDescriptor {
        name: "skip_track",
        description: "Skip to the next track",
        params: &[],
    },
    ToolDescriptor {
        name: "previous_track",
        description: "Go back to the previous track",
        params: &[],
    },
    ToolDescriptor {
        name: "set_volume",
        description: "Set playback volume (0-100)",
        params: &[ParamSpec::required(
            "volume_percent",
            "Volume level 0-100",
            ParamKind::Integer {
                min: 0,
                max: 100,
                policy: RangePolicy::Reject,
            },
        )],
    },
    ToolDescriptor {
        name: "create_playlist",
        description: "Create a new playlist",
        params: &[
            ParamSpec::required("playlist_name", "Name of the new playlist", ParamKind::String),
            ParamSpec::optional(
                "public",
                "Make playlist public (default: true)",
                ParamKind::Boolean { default: true },
            ),
        ],
    },
    ToolDescriptor {
        name: "add_to_playlist",
        description: "Add a song to an existing playlist",
        params: &[
            ParamSpec::required("song_title", "Title of the song to add", ParamKind::String),
            ParamSpec::required("playlist_name", "Name of the playlist", ParamKind::String),
            ARTIST,
        ],
    },
    ToolDescriptor {
        name: "get_current_playback_info",
        description: "Get information about current playback and song",
        params: &[],
    },
    ToolDescriptor {
        name: "search_songs",
        description: "Search for songs, albums, or artists",
        params: &[
            ParamSpec::required("query", "Search query", ParamKind::String),
            ParamSpec::optional(
                "search_type",
                "Type of search",
                ParamKind::Enum {
                    values: SEARCH_TYPES,
                    default: "track",
                },
            ),
            ParamSpec::optional(
                "limit",
                "Number of results (default: 10)",
                ParamKind::Integer {
                    min: 1,
                    max: 50,
                    policy: RangePolicy::Fallback(DEFAULT_SEARCH_LIMIT),
                },
            ),
        ],
    },
    ToolDescriptor {
        name: "get_user_playlists",
        description: "Get user's playlists",
        params: &[],
    },
];

/// Every tool, in menu order. Independent of session state.
pub fn list_tools() -> &'static [ToolDescriptor] {
    CATALOG
}

pub fn find(name: &str) -> Option<&'static ToolDescriptor> {
    CATALOG.iter().find(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catalog_names_are_the_wire_contract() {
        let names: Vec<&str> = list_tools().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "authenticate_spotify",
                "play_song",
                "pause_playback",
                "resume_playback",
                "skip_track",
                "previous_track",
                "set_volume",
                "create_playlist",
                "add_to_playlist",
                "get_current_playback_info",
                "search_songs",
                "get_user_playlists",
            ]
        );
    }

    #[test]
    fn test_volume_schema() {
        let schema = find("set_volume").unwrap().input_schema();
        assert_eq!(
            Value::Object(schema),
            json!({
                "type": "object",
                "properties": {
                    "volume_percent": {
                        "type": "integer",
                        "minimum": 0,
                        "maximum": 100,
                        "description": "Volume level 0-100"
                    }
                },
                "required": ["volume_percent"]
            })
        );
    }

    #[test]
    fn test_search_schema_has_enum_and_default_limit() {
        let schema = Value::Object(find("search_songs").unwrap().input_schema());
        assert_eq!(
            schema["properties"]["search_type"]["enum"],
            json!(["track", "artist", "album", "playlist"])
        );
        assert_eq!(schema["properties"]["limit"]["default"], json!(10));
        assert_eq!(schema["required"], json!(["query"]));
    }

    #[test]
    fn test_parameterless_tool_schema() {
        let schema = Value::Object(find("pause_playback").unwrap().input_schema());
        assert_eq!(schema["properties"], json!({}));
        assert_eq!(schema["required"], json!([]));
    }

    #[test]
    fn test_unknown_tool() {
        assert!(find("shuffle").is_none());
    }
}
