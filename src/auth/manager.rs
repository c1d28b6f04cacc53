//! Session lifecycle: cached-token hydration, authorization issuance,
//! redirect handling and the swappable session handle.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use super::browser::{SystemOpener, UrlOpener};
use super::cache::TokenCache;
use super::callback::{self, ListenerHandle};
use super::connector::{Connector, TokenInfo};
use crate::config::{SpotifyConfig, AUTHORIZE_URL, SCOPES};
use crate::error::{AuthError, ConfigError};
use crate::spotify::{AccountsClient, SpotifyApi, UserProfile};

/// An authenticated client handle plus the token it was built from.
///
/// Never mutated; a new session replaces the old one wholesale.
pub struct Session {
    client: Arc<dyn SpotifyApi>,
    token: TokenInfo,
}

impl Session {
    pub fn new(client: Arc<dyn SpotifyApi>, token: TokenInfo) -> Self {
        Self { client, token }
    }

    pub fn client(&self) -> &Arc<dyn SpotifyApi> {
        &self.client
    }

    pub fn token(&self) -> &TokenInfo {
        &self.token
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            has_token: !self.token.access_token.is_empty(),
            token_is_valid: !self.token.is_expired(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &self.token).finish()
    }
}

/// Snapshot of session state, computed without network I/O.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub has_token: bool,
    pub token_is_valid: bool,
}

/// State needed to complete one authorization-code exchange.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub authorize_url: String,
    pub redirect_uri: String,
    pub created_at: DateTime<Utc>,
}

/// Latest sign-in event, observed through [`AuthManager::subscribe`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthEvent {
    #[default]
    Idle,
    /// A session was installed, from the cache, a redirect or a refresh.
    SignedIn,
    /// The callback listener received a redirect that yielded no session.
    CallbackFailed(AuthError),
}

/// Result of an `authenticate` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The existing session answered a profile read.
    AlreadyAuthenticated { user: Option<UserProfile> },
    /// The existing session was stale and a refresh succeeded.
    Refreshed { user: Option<UserProfile> },
    /// Browser flow started; the listener will receive the redirect.
    AwaitingCallback { url: String, browser_opened: bool },
    /// No listener could be bound; the redirect must be pasted back.
    ManualCompletionRequired { url: String },
}

impl AuthOutcome {
    pub fn authorize_url(&self) -> Option<&str> {
        match self {
            AuthOutcome::AwaitingCallback { url, .. }
            | AuthOutcome::ManualCompletionRequired { url } => Some(url),
            _ => None,
        }
    }
}

fn describe_user(user: Option<&UserProfile>) -> Option<String> {
    let user = user.filter(|u| !u.id.is_empty())?;
    Some(match user.display_name.as_deref().filter(|d| !d.is_empty()) {
        Some(name) => format!("{} ({})", name, user.id),
        None => format!("user ID: {}", user.id),
    })
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthOutcome::AlreadyAuthenticated { user } => match describe_user(user.as_ref()) {
                Some(who) => write!(f, "✅ Already authenticated as {}", who),
                None => write!(f, "✅ Already authenticated."),
            },
            AuthOutcome::Refreshed { user } => match describe_user(user.as_ref()) {
                Some(who) => write!(f, "✅ Session refreshed. Authenticated as {}", who),
                None => write!(f, "✅ Session refreshed."),
            },
            AuthOutcome::AwaitingCallback { url, .. } => write!(
                f,
                "🔐 Opening browser for Spotify authentication...\n\n\
                 If browser doesn't open, visit:\n{}\n\n\
                 After authorization, the server will automatically receive the token.",
                url
            ),
            AuthOutcome::ManualCompletionRequired { url } => write!(
                f,
                "⚠️ Could not start the local callback listener.\n\n\
                 Visit this URL to authorize:\n{}\n\n\
                 Then run `spotify-mcp login` and paste the address you were redirected to, \
                 and run 'authenticate_spotify' again.",
                url
            ),
        }
    }
}

/// Owns OAuth configuration and the current session.
///
/// Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct AuthManager {
    config: Arc<SpotifyConfig>,
    scopes: Arc<Vec<String>>,
    cache: TokenCache,
    connector: Arc<dyn Connector>,
    opener: Arc<dyn UrlOpener>,
    session: Arc<ArcSwapOption<Session>>,
    pending: Arc<Mutex<Option<PendingAuthorization>>>,
    listener: Arc<Mutex<Option<ListenerHandle>>>,
    events: Arc<watch::Sender<AuthEvent>>,
}

impl AuthManager {
    /// Build a manager from raw credentials, talking to the real provider.
    ///
    /// `cache_path` defaults to `~/.spotify_mcp_cache`.
    pub fn configure(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
        cache_path: Option<PathBuf>,
        scopes: &[&str],
    ) -> Result<Self, ConfigError> {
        let config = SpotifyConfig::new(client_id, client_secret, redirect_uri, cache_path)?;
        Ok(Self::from_config(config).with_scopes(scopes))
    }

    /// Production wiring: token endpoint over HTTP, system browser.
    pub fn from_config(config: SpotifyConfig) -> Self {
        let connector = Arc::new(AccountsClient::new(config.clone()));
        Self::new(config, connector, Arc::new(SystemOpener))
    }

    pub fn new(
        config: SpotifyConfig,
        connector: Arc<dyn Connector>,
        opener: Arc<dyn UrlOpener>,
    ) -> Self {
        let (events, _) = watch::channel(AuthEvent::Idle);
        Self {
            cache: TokenCache::new(config.cache_path.clone()),
            config: Arc::new(config),
            scopes: Arc::new(SCOPES.iter().map(|s| s.to_string()).collect()),
            connector,
            opener,
            session: Arc::new(ArcSwapOption::empty()),
            pending: Arc::new(Mutex::new(None)),
            listener: Arc::new(Mutex::new(None)),
            events: Arc::new(events),
        }
    }

    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes = Arc::new(scopes.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    /// Space-separated requested scopes.
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    /// Hydrate a session from the cached credential blob. No network I/O.
    ///
    /// Unreadable blobs, empty tokens and tokens missing a requested scope
    /// are ignored. An expired token is still accepted.
    pub fn try_hydrate(&self) -> Option<Arc<Session>> {
        let token = match self.cache.load() {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable token cache");
                return None;
            }
        };

        if token.access_token.is_empty() {
            debug!("Cached token is empty");
            return None;
        }
        let scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
        if !token.covers_scopes(&scopes) {
            info!("Cached token lacks requested scopes, re-authorization required");
            return None;
        }

        info!(expired = token.is_expired(), "Hydrated session from token cache");
        Some(self.install(token, false))
    }

    /// Build the authorize URL and record the pending authorization.
    pub async fn begin_authorization(&self) -> Result<PendingAuthorization, AuthError> {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.scope_string().as_str()),
            ],
        )
        .map_err(|e| AuthError::Provider(format!("could not build authorize URL: {}", e)))?;

        let pending = PendingAuthorization {
            authorize_url: url.to_string(),
            redirect_uri: self.config.redirect_uri.clone(),
            created_at: Utc::now(),
        };
        *self.pending.lock().await = Some(pending.clone());
        Ok(pending)
    }

    pub async fn pending_authorization(&self) -> Option<PendingAuthorization> {
        self.pending.lock().await.clone()
    }

    /// Bind the callback listener unless one is already running.
    ///
    /// Returns the bound address, or `None` when every candidate failed.
    pub async fn start_callback_listener(&self) -> Option<SocketAddr> {
        let mut slot = self.listener.lock().await;
        if let Some(handle) = slot.as_ref() {
            return Some(handle.local_addr());
        }

        let candidates =
            callback::bind_candidates(self.config.callback_host(), self.config.callback_port());
        let listener = callback::bind_first(&candidates).await?;
        let handle = callback::serve(listener, self.config.callback_path(), self.clone())?;
        let addr = handle.local_addr();
        *slot = Some(handle);
        Some(addr)
    }

    /// Address of the running callback listener, if any.
    pub async fn listener_addr(&self) -> Option<SocketAddr> {
        self.listener.lock().await.as_ref().map(ListenerHandle::local_addr)
    }

    /// Stop the callback listener.
    pub async fn stop_callback_listener(&self) {
        if self.listener.lock().await.take().is_some() {
            debug!("Callback listener stopped");
        }
    }

    /// Complete an authorization from redirect query parameters.
    ///
    /// Failures are also published to [`subscribe`](Self::subscribe) receivers.
    #[instrument(name = "auth.handle_redirect", skip_all)]
    pub async fn handle_redirect(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<Arc<Session>, AuthError> {
        let result = self.exchange_redirect(params).await;
        if let Err(e) = &result {
            self.events.send_replace(AuthEvent::CallbackFailed(e.clone()));
        }
        result
    }

    async fn exchange_redirect(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<Arc<Session>, AuthError> {
        if let Some(error) = params.get("error") {
            warn!(error = %error, "Provider returned an authorization error");
            self.pending.lock().await.take();
            return Err(AuthError::Provider(error.clone()));
        }

        let code = params
            .get("code")
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::InvalidCallback)?;

        let exchanged = self.connector.exchange_code(code).await;
        self.pending.lock().await.take();
        let token = exchanged?;

        info!("Authorization code exchanged");
        Ok(self.install(token, true))
    }

    /// Complete an authorization from a pasted redirect URL or query string.
    pub async fn complete_from_redirect(&self, input: &str) -> Result<Arc<Session>, AuthError> {
        let params = parse_redirect_input(input)?;
        self.exchange_redirect(&params).await
    }

    /// The current session, if any. No network I/O.
    pub fn current_session(&self) -> Option<Arc<Session>> {
        self.session.load_full()
    }

    pub fn session_status(&self) -> SessionStatus {
        self.current_session()
            .map(|s| s.status())
            .unwrap_or_default()
    }

    /// Receiver notified when a session is installed or a callback fails.
    ///
    /// Pasted redirects report failures to their caller only.
    pub fn subscribe(&self) -> watch::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Establish a session, reusing the current one when it still works.
    #[instrument(name = "auth.authenticate", skip_all)]
    pub async fn authenticate(&self) -> Result<AuthOutcome, AuthError> {
        if self.current_session().is_none() {
            self.try_hydrate();
        }

        if let Some(session) = self.current_session() {
            match session.client().current_user().await {
                Ok(user) => {
                    return Ok(AuthOutcome::AlreadyAuthenticated { user: Some(user) });
                }
                Err(e) => {
                    warn!(error = %e, "Current session rejected");
                    if let Some(refresh_token) = session.token().refresh_token.as_deref() {
                        match self.refresh(refresh_token).await {
                            Ok(fresh) => {
                                let user = fresh.client().current_user().await.ok();
                                return Ok(AuthOutcome::Refreshed { user });
                            }
                            Err(e) => warn!(error = %e, "Token refresh failed"),
                        }
                    }
                }
            }
        }

        let pending = self.begin_authorization().await?;
        let url = pending.authorize_url;

        if self.start_callback_listener().await.is_none() {
            warn!("No callback listener, manual completion required");
            return Ok(AuthOutcome::ManualCompletionRequired { url });
        }

        let browser_opened = self.opener.open(&url);
        info!(browser_opened, "Authorization started");
        Ok(AuthOutcome::AwaitingCallback {
            url,
            browser_opened,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Arc<Session>, AuthError> {
        let token = self.connector.refresh(refresh_token).await?;
        info!("Access token refreshed");
        Ok(self.install(token, true))
    }

    /// Swap in a new session built from `token`.
    fn install(&self, token: TokenInfo, persist: bool) -> Arc<Session> {
        if persist {
            if let Err(e) = self.cache.save(&token) {
                warn!(error = %e, "Could not write token cache");
            }
        }
        let client = self.connector.connect(&token);
        let session = Arc::new(Session::new(client, token));
        self.session.store(Some(Arc::clone(&session)));
        self.events.send_replace(AuthEvent::SignedIn);
        session
    }
}

/// Parse a pasted redirect URL (or bare query string) into parameters.
pub fn parse_redirect_input(input: &str) -> Result<HashMap<String, String>, AuthError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AuthError::InvalidCallback);
    }

    let url = if input.contains("://") {
        Url::parse(input).map_err(|_| AuthError::InvalidCallback)?
    } else {
        let query = input.trim_start_matches('?');
        Url::parse(&format!("http://localhost/?{}", query))
            .map_err(|_| AuthError::InvalidCallback)?
    };

    Ok(url.query_pairs().into_owned().collect())
}
