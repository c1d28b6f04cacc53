//! Token endpoint seam and the credential blob it produces.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::spotify::SpotifyApi;

/// Cached OAuth credential, in the common Spotify client cache layout.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenInfo")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl TokenInfo {
    /// Build from a token endpoint answer, stamping `expires_at` from now.
    pub fn issued_now(
        access_token: impl Into<String>,
        expires_in: i64,
        scope: impl Into<String>,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_in,
            scope: scope.into(),
            expires_at: Utc::now().timestamp() + expires_in,
            refresh_token,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now().timestamp()
    }

    /// Whether the granted scope string contains every requested scope.
    pub fn covers_scopes(&self, requested: &[&str]) -> bool {
        let granted: Vec<&str> = self.scope.split_whitespace().collect();
        requested.iter().all(|s| granted.contains(s))
    }

    /// Refresh responses may omit the refresh token; keep the previous one.
    pub fn inherit_refresh_token(mut self, previous: Option<&str>) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.map(str::to_string);
        }
        self
    }
}

/// Exchanges grants at the token endpoint and builds client handles.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Trade an authorization code for a token.
    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, AuthError>;

    /// Trade a refresh token for a fresh access token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenInfo, AuthError>;

    /// Client handle bound to `token`.
    fn connect(&self, token: &TokenInfo) -> Arc<dyn SpotifyApi>;
}
