use thiserror::Error;

use crate::error::{AuthError, RemoteError, ValidationError};

/// Everything that can go wrong inside `ToolDispatcher::invoke`.
///
/// Never escapes the dispatcher: each variant is rendered into a single
/// text outcome.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Not authenticated. Please run 'authenticate_spotify' first.")]
    NotAuthenticated,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Error {context}: {source}")]
    Remote {
        context: &'static str,
        source: RemoteError,
    },

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    pub fn remote(context: &'static str) -> impl FnOnce(RemoteError) -> ToolError {
        move |source| ToolError::Remote { context, source }
    }

    /// Stable classification for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            ToolError::NotAuthenticated => "NOT_AUTHENTICATED",
            ToolError::Validation(_) => "VALIDATION_ERROR",
            ToolError::Remote { source, .. } => match source {
                RemoteError::NotFound(_) => "NOT_FOUND",
                RemoteError::RateLimited { .. } => "RATE_LIMITED",
                RemoteError::Unauthorized(_) => "UNAUTHORIZED",
                _ => "REMOTE_ERROR",
            },
            ToolError::Auth(_) => "AUTH_ERROR",
            ToolError::UnknownTool(_) => "UNKNOWN_TOOL",
        }
    }
}
