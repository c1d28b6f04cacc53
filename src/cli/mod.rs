//! CLI interface for spotify-mcp.

pub mod handlers;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::auth::AuthManager;
use crate::config::SCOPES;
use crate::error::ConfigError;
use output::OutputMode;

/// Spotify playback and library control over MCP or an interactive menu
#[derive(Parser)]
#[command(name = "spotify-mcp", version, about, long_about = None)]
pub struct Cli {
    /// Spotify application client ID
    #[arg(long, env = "SPOTIFY_CLIENT_ID", global = true, hide_env_values = true)]
    pub client_id: Option<String>,

    /// Spotify application client secret
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// OAuth redirect URI (default: http://[::1]:8888/callback)
    #[arg(long, env = "SPOTIFY_REDIRECT_URI", global = true)]
    pub redirect_uri: Option<String>,

    /// Cached token file (default: ~/.spotify_mcp_cache)
    #[arg(long, env = "SPOTIFY_CACHE_PATH", global = true)]
    pub cache_path: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Build the auth manager from flags and environment.
    pub fn auth_manager(&self) -> Result<AuthManager, ConfigError> {
        AuthManager::configure(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.redirect_uri.clone(),
            self.cache_path.clone(),
            SCOPES,
        )
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start MCP server (stdio transport)
    Mcp,

    /// Interactive numbered menu (default when no command is given)
    Menu,

    /// Invoke one tool and print its outcome
    Call {
        /// Tool name (see `spotify-mcp tools`)
        tool: String,
        /// Tool argument as key=value; values are parsed as JSON when possible (repeatable)
        #[arg(long = "arg", value_parser = parse_key_val, action = clap::ArgAction::Append)]
        args: Vec<(String, String)>,
    },

    /// List the tool catalog
    Tools,

    /// Sign in to Spotify and wait for the browser redirect
    Login {
        /// Seconds to wait for the redirect before giving up
        #[arg(long, default_value = "300")]
        timeout: u64,
    },

    /// Show whether a session token is loaded and valid
    Status,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: clap_complete::Shell,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid key=value: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Commands that need neither credentials nor a session.
///
/// Returns `false` when `command` needs the full context.
pub fn execute_offline(command: &Commands, mode: OutputMode) -> bool {
    match command {
        Commands::Tools => {
            handlers::tools::handle_tools(mode);
            true
        }
        Commands::Completions { shell } => {
            handlers::completions::handle_completions(*shell);
            true
        }
        _ => false,
    }
}

/// Execute a CLI command, dispatching to the appropriate handler.
pub async fn execute(
    command: &Commands,
    ctx: &crate::init::AppContext,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match command {
        Commands::Mcp => crate::mcp::run_mcp_server(ctx.clone()).await?,
        Commands::Menu => handlers::menu::handle_menu(ctx).await?,
        Commands::Call { tool, args } => handlers::call::handle_call(ctx, tool, args, mode).await?,
        Commands::Login { timeout } => handlers::login::handle_login(ctx, *timeout, mode).await?,
        Commands::Status => handlers::status::handle_status(ctx, mode).await,
        Commands::Tools => handlers::tools::handle_tools(mode),
        Commands::Completions { shell } => handlers::completions::handle_completions(*shell),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("volume_percent=50").unwrap(),
            ("volume_percent".to_string(), "50".to_string())
        );
        assert_eq!(
            parse_key_val("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
    }

    #[test]
    fn test_call_parses_repeated_args() {
        let cli = Cli::try_parse_from([
            "spotify-mcp",
            "call",
            "search_songs",
            "--arg",
            "query=jazz",
            "--arg",
            "limit=5",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Call { tool, args }) => {
                assert_eq!(tool, "search_songs");
                assert_eq!(args.len(), 2);
            }
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["spotify-mcp"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_auth_manager_from_flags() {
        let cli = Cli::try_parse_from([
            "spotify-mcp",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--redirect-uri",
            "http://127.0.0.1:8888",
            "--cache-path",
            "/tmp/spotify-mcp-test-cache",
            "status",
        ])
        .unwrap();
        let auth = cli.auth_manager().unwrap();
        assert_eq!(auth.config().redirect_uri, "http://127.0.0.1:8888");
        assert_eq!(
            auth.config().cache_path,
            PathBuf::from("/tmp/spotify-mcp-test-cache")
        );
        assert_eq!(auth.scope_string(), SCOPES.join(" "));
    }

    #[test]
    fn test_auth_manager_rejects_blank_client_id() {
        let cli = Cli::try_parse_from([
            "spotify-mcp",
            "--client-id",
            "",
            "--client-secret",
            "secret",
            "status",
        ])
        .unwrap();
        let err = cli.auth_manager().err().expect("blank client id");
        assert!(matches!(
            err,
            ConfigError::MissingCredential("SPOTIFY_CLIENT_ID", _)
        ));
    }
}
