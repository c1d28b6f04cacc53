//! MCP surface: tool definitions, result mapping and the status resource.

mod common;

use serde_json::{json, Value};

use common::TestHarness;
use spotify_mcp::mcp::server::to_call_tool_result;
use spotify_mcp::mcp::SpotifyServer;
use spotify_mcp::tools::{list_tools, ToolRequest};

#[test]
fn tool_definitions_mirror_the_catalog() {
    let harness = TestHarness::new();
    let server = SpotifyServer::new(harness.dispatcher.clone());
    let tools = server.tool_definitions();

    assert_eq!(tools.len(), 12);
    let names: Vec<&str> = tools.iter().map(|t| &*t.name).collect();
    let catalog: Vec<&str> = list_tools().iter().map(|t| t.name).collect();
    assert_eq!(names, catalog);

    let volume = tools
        .iter()
        .find(|t| t.name == "set_volume")
        .expect("set_volume is advertised");
    let schema = Value::Object((*volume.input_schema).clone());
    assert_eq!(schema["required"], json!(["volume_percent"]));
    assert_eq!(schema["properties"]["volume_percent"]["maximum"], json!(100));

    let search = tools.iter().find(|t| t.name == "search_songs").unwrap();
    let schema = Value::Object((*search.input_schema).clone());
    assert_eq!(schema["required"], json!(["query"]));
    assert_eq!(schema["properties"]["limit"]["default"], json!(10));
    assert_eq!(
        schema["properties"]["search_type"]["enum"],
        json!(["track", "artist", "album", "playlist"])
    );
}

#[tokio::test]
async fn failed_invocations_are_flagged_errors() {
    let harness = TestHarness::new();
    let server = SpotifyServer::new(harness.dispatcher.clone());

    let result = server
        .dispatcher()
        .invoke(ToolRequest::new("pause_playback"))
        .await;
    let mapped = to_call_tool_result(result);
    assert_eq!(mapped.is_error, Some(true));
    assert_eq!(mapped.content.len(), 1);

    harness.sign_in().await;
    let result = server
        .dispatcher()
        .invoke(ToolRequest::new("pause_playback"))
        .await;
    assert_eq!(to_call_tool_result(result).is_error, Some(false));
}

#[tokio::test]
async fn session_status_resource_tracks_sign_in() {
    let harness = TestHarness::new();
    let server = SpotifyServer::new(harness.dispatcher.clone());

    let before: Value = serde_json::from_str(&server.session_status_json()).unwrap();
    assert_eq!(before, json!({ "has_token": false, "token_is_valid": false }));

    harness.sign_in().await;
    let after: Value = serde_json::from_str(&server.session_status_json()).unwrap();
    assert_eq!(after, json!({ "has_token": true, "token_is_valid": true }));
}
