use std::sync::Arc;

use rmcp::{
    model::*, service::RequestContext, ErrorData as McpError, RoleServer, ServerHandler,
    ServiceExt,
};
use tracing::instrument;

use crate::init::AppContext;
use crate::tools::{ToolDispatcher, ToolRequest, ToolResult};

/// URI of the session status resource.
pub const SESSION_STATUS_URI: &str = "spotify://session/status";

#[derive(Clone)]
pub struct SpotifyServer {
    dispatcher: Arc<ToolDispatcher>,
}

impl SpotifyServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(ctx.dispatcher.clone())
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Catalog rendered as MCP tool definitions.
    pub fn tool_definitions(&self) -> Vec<Tool> {
        self.dispatcher
            .list_tools()
            .iter()
            .map(|t| Tool::new(t.name, t.description, Arc::new(t.input_schema())))
            .collect()
    }

    /// Session status as pretty JSON.
    pub fn session_status_json(&self) -> String {
        let status = self.dispatcher.auth().session_status();
        serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Convert a dispatcher outcome into an MCP tool result.
pub fn to_call_tool_result(result: ToolResult) -> CallToolResult {
    let is_error = result.is_error;
    let contents = result.segments.into_iter().map(Content::text).collect();
    if is_error {
        CallToolResult::error(contents)
    } else {
        CallToolResult::success(contents)
    }
}

impl ServerHandler for SpotifyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "spotify-mcp".to_string(),
                title: Some("Spotify Playback Control".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(r#"# Spotify Playback Control

Run authenticate_spotify first. It opens a browser for Spotify login; the
token is cached, so later sessions start authenticated.

## Playback
- play_song(song_title, artist?) — search and play the top match
- pause_playback, resume_playback, skip_track, previous_track
- set_volume(volume_percent 0-100)
- get_current_playback_info

## Library
- search_songs(query, search_type?, limit?)
- get_user_playlists
- create_playlist(playlist_name, public?)
- add_to_playlist(song_title, playlist_name, artist?)

## Resources
- spotify://session/status — whether a token is loaded and still valid
"#
            .to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_definitions(),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(name = "mcp.call_tool", skip_all, fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let request = ToolRequest {
            name: request.name.to_string(),
            arguments: request.arguments.unwrap_or_default(),
        };
        let result = self.dispatcher.invoke(request).await;
        Ok(to_call_tool_result(result))
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![Annotated::new(
                RawResource {
                    uri: SESSION_STATUS_URI.to_string(),
                    name: "Session Status".to_string(),
                    title: None,
                    description: Some(
                        "Whether a Spotify token is loaded and whether it is still valid"
                            .to_string(),
                    ),
                    mime_type: Some("application/json".to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                },
                None,
            )],
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = &request.uri;

        if uri != SESSION_STATUS_URI {
            return Err(McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                None,
            ));
        }

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::TextResourceContents {
                uri: uri.to_string(),
                mime_type: Some("application/json".to_string()),
                text: self.session_status_json(),
                meta: None,
            }],
        })
    }
}

pub async fn run_mcp_server(ctx: AppContext) -> anyhow::Result<()> {
    let server = SpotifyServer::from_context(&ctx);
    let tool_count = server.dispatcher().list_tools().len();

    tracing::info!("Starting Spotify MCP server v{}", env!("CARGO_PKG_VERSION"));

    // Stdio transport
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server.serve(transport).await?;
    tracing::info!("MCP server listening on stdio ({} tools)", tool_count);

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
    });

    service.waiting().await?;

    ctx.auth.stop_callback_listener().await;
    tracing::info!("MCP server shutting down");

    Ok(())
}
