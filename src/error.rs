use thiserror::Error;

/// Configuration problems detected at startup. The only fatal error class.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required credential was absent or blank.
    #[error("{0} must be set (pass --{1} or export {0})")]
    MissingCredential(&'static str, &'static str),

    /// The redirect URI could not be parsed or lacks a host/port.
    #[error("Invalid redirect URI '{uri}': {reason}")]
    InvalidRedirectUri { uri: String, reason: String },
}

/// Failures while establishing a session.
///
/// Recoverable: surfaced as text, the caller may run authentication again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The provider redirected back with an `error` parameter.
    #[error("{0}")]
    Provider(String),

    /// The redirect carried neither `code` nor `error`.
    #[error("Invalid callback request")]
    InvalidCallback,

    /// The token endpoint answered but refused the grant.
    #[error("Failed to get access token: {0}")]
    ExchangeRejected(String),

    /// The token endpoint could not be reached or answered garbage.
    #[error("Token endpoint unreachable: {0}")]
    Transport(String),

    /// Reading or writing the cached credential blob failed.
    #[error("Token cache error: {0}")]
    Cache(String),
}

/// Any failure reported by (or while talking to) the remote API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}. Run 'authenticate_spotify' to sign in again.")]
    Unauthorized(String),

    #[error("Rate limited by Spotify{}", retry_suffix(.retry_after))]
    RateLimited { retry_after: Option<u64> },

    #[error("Spotify API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Malformed tool arguments. Always names the offending field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid argument '{field}': {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

fn retry_suffix(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" (retry after {}s)", secs),
        None => String::new(),
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::Cache(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Cache(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_display_with_and_without_retry() {
        let with = RemoteError::RateLimited {
            retry_after: Some(3),
        };
        assert_eq!(with.to_string(), "Rate limited by Spotify (retry after 3s)");

        let without = RemoteError::RateLimited { retry_after: None };
        assert_eq!(without.to_string(), "Rate limited by Spotify");
    }

    #[test]
    fn test_validation_error_names_field() {
        let err = ValidationError::new("volume_percent", "must be between 0 and 100");
        insta::assert_snapshot!(err.to_string(), @"Invalid argument 'volume_percent': must be between 0 and 100");
    }

    #[test]
    fn test_missing_credential_mentions_flag_and_env() {
        let err = ConfigError::MissingCredential("SPOTIFY_CLIENT_ID", "client-id");
        let msg = err.to_string();
        assert!(msg.contains("SPOTIFY_CLIENT_ID"));
        assert!(msg.contains("--client-id"));
    }
}
