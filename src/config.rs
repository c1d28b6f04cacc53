//! Configuration resolution for the Spotify OAuth client.

use std::fmt;
use std::path::PathBuf;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Redirect URI used when none is configured.
pub const DEFAULT_REDIRECT_URI: &str = "http://[::1]:8888/callback";

/// File name of the cached credential blob under the home directory.
pub const DEFAULT_CACHE_FILE: &str = ".spotify_mcp_cache";

pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Every scope the tool catalog needs. Requested once, never per operation.
pub const SCOPES: &[&str] = &[
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "playlist-read-private",
    "playlist-read-collaborative",
    "playlist-modify-public",
    "playlist-modify-private",
    "user-library-read",
    "user-library-modify",
    "streaming",
];

/// Validated OAuth client configuration.
#[derive(Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    /// Sent to the provider exactly as configured.
    pub redirect_uri: String,
    redirect_url: Url,
    pub cache_path: PathBuf,
}

impl fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("cache_path", &self.cache_path)
            .finish()
    }
}

impl SpotifyConfig {
    /// Build a configuration, rejecting absent credentials.
    ///
    /// Redirect URI falls back to [`DEFAULT_REDIRECT_URI`], cache path to
    /// `~/.spotify_mcp_cache`.
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
        cache_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let client_id = client_id
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingCredential("SPOTIFY_CLIENT_ID", "client-id"))?;
        let client_secret = client_secret
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(
                "SPOTIFY_CLIENT_SECRET",
                "client-secret",
            ))?;

        let redirect_uri = redirect_uri
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
        let redirect_url = parse_redirect_uri(&redirect_uri)?;

        let cache_path = cache_path.unwrap_or_else(default_cache_path);

        Ok(Self {
            client_id,
            client_secret: SecretString::from(client_secret),
            redirect_uri,
            redirect_url,
            cache_path,
        })
    }

    pub fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }

    /// Host the callback listener binds first, without IPv6 brackets.
    pub fn callback_host(&self) -> Option<&str> {
        self.redirect_url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
    }

    /// Port the callback listener binds, taken from the redirect URI.
    pub fn callback_port(&self) -> u16 {
        self.redirect_url.port_or_known_default().unwrap_or(8888)
    }

    /// Path component the provider redirects to (normally `/callback`).
    pub fn callback_path(&self) -> &str {
        self.redirect_url.path()
    }
}

fn parse_redirect_uri(raw: &str) -> Result<Url, ConfigError> {
    let uri = Url::parse(raw).map_err(|e| ConfigError::InvalidRedirectUri {
        uri: raw.to_string(),
        reason: e.to_string(),
    })?;

    if uri.host_str().is_none() {
        return Err(ConfigError::InvalidRedirectUri {
            uri: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }
    if uri.port_or_known_default().is_none() {
        return Err(ConfigError::InvalidRedirectUri {
            uri: raw.to_string(),
            reason: "missing port".to_string(),
        });
    }

    Ok(uri)
}

/// Default cached credential path (`~/.spotify_mcp_cache`).
pub fn default_cache_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(DEFAULT_CACHE_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE))
}
