//! spotify-mcp - Spotify playback and library control for assistants
//!
//! Usage:
//!   spotify-mcp                  Interactive menu
//!   spotify-mcp mcp              Start MCP server on stdio
//!   spotify-mcp login            Sign in and cache the token
//!   spotify-mcp call play_song --arg song_title="Hey Jude"
//!   spotify-mcp tools            List the tool catalog
//!   spotify-mcp --help           Show all commands

use anyhow::Result;
use clap::Parser;

use spotify_mcp::cli::output::OutputMode;
use spotify_mcp::cli::{Cli, Commands};
use spotify_mcp::init::AppContext;
use spotify_mcp::mcp::run_mcp_server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr (safe for MCP stdio transport)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spotify_mcp=info".parse()?),
        )
        .init();

    let mode = OutputMode::from_json_flag(cli.json);
    let command = cli.command.clone().unwrap_or(Commands::Menu);

    if spotify_mcp::cli::execute_offline(&command, mode) {
        return Ok(());
    }

    let ctx = AppContext::new(cli.auth_manager()?);

    match &command {
        Commands::Mcp => run_mcp_server(ctx).await?,
        cmd => spotify_mcp::cli::execute(cmd, &ctx, mode).await?,
    }

    Ok(())
}
