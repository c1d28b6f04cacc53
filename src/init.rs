//! Shared initialization logic for MCP and CLI modes.

use crate::auth::AuthManager;
use crate::tools::ToolDispatcher;

/// Application context shared between the MCP server and CLI commands.
#[derive(Clone)]
pub struct AppContext {
    pub auth: AuthManager,
    pub dispatcher: ToolDispatcher,
}

impl AppContext {
    /// Wrap the auth manager and hydrate any cached session.
    pub fn new(auth: AuthManager) -> Self {
        let config = auth.config();
        tracing::info!("Using token cache: {}", config.cache_path.display());
        tracing::debug!(redirect_uri = %config.redirect_uri, "OAuth redirect");

        match auth.try_hydrate() {
            Some(session) => {
                let status = session.status();
                tracing::info!(
                    token_is_valid = status.token_is_valid,
                    "Cached Spotify session loaded"
                );
            }
            None => tracing::info!("No cached Spotify session, run 'authenticate_spotify'"),
        }

        let dispatcher = ToolDispatcher::new(auth.clone());
        Self { auth, dispatcher }
    }
}
