//! Token endpoint adapter (`accounts.spotify.com`).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::{Connector, TokenInfo};
use crate::config::{SpotifyConfig, API_BASE_URL, TOKEN_URL};
use crate::error::AuthError;

use super::{SpotifyApi, WebApiClient};

/// Production `Connector`: HTTP basic auth with the client credentials and a
/// form-encoded grant body.
pub struct AccountsClient {
    http: reqwest::Client,
    config: SpotifyConfig,
    token_url: String,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl AccountsClient {
    pub fn new(config: SpotifyConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token_url: TOKEN_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point both the token endpoint and the API at other hosts.
    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.api_base_url = api_base_url.into();
        self
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenInfo, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.config.client_id, Some(self.config.client_secret()))
            .form(form)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(status = %status, "Token endpoint rejected grant");
            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{} ({})", err.error, desc),
                    None => err.error,
                },
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            return Err(AuthError::ExchangeRejected(reason));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::Transport(format!("malformed token response: {}", e)))?;
        debug!(expires_in = parsed.expires_in, "Token issued");

        let mut token = TokenInfo::issued_now(
            parsed.access_token,
            parsed.expires_in,
            parsed.scope.unwrap_or_default(),
            parsed.refresh_token,
        );
        if let Some(token_type) = parsed.token_type {
            token.token_type = token_type;
        }
        Ok(token)
    }
}

#[async_trait]
impl Connector for AccountsClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, AuthError> {
        let redirect_uri = self.config.redirect_uri.as_str();
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenInfo, AuthError> {
        let token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;
        Ok(token.inherit_refresh_token(Some(refresh_token)))
    }

    fn connect(&self, token: &TokenInfo) -> Arc<dyn SpotifyApi> {
        Arc::new(WebApiClient::with_base_url(
            self.http.clone(),
            self.api_base_url.clone(),
            token.access_token.clone(),
        ))
    }
}
