//! Test harness wiring the auth manager and dispatcher to in-memory stubs.
//!
//! Each harness owns a temporary directory for the token cache, so tests
//! never touch the real `~/.spotify_mcp_cache`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;

use spotify_mcp::auth::{AuthManager, RecordingOpener};
use spotify_mcp::config::SpotifyConfig;
use spotify_mcp::spotify::{StubConnector, StubSpotifyApi};
use spotify_mcp::tools::{ToolDispatcher, ToolRequest, ToolResult};

use super::builders::sample_api;

/// Redirect bound on an ephemeral loopback port.
pub const TEST_REDIRECT_URI: &str = "http://127.0.0.1:0/callback";

pub struct TestHarness {
    pub api: Arc<StubSpotifyApi>,
    pub connector: Arc<StubConnector>,
    pub opener: Arc<RecordingOpener>,
    pub auth: AuthManager,
    pub dispatcher: ToolDispatcher,
    /// Temporary directory (kept alive while harness exists)
    pub temp_dir: TempDir,
    redirect_uri: String,
}

impl TestHarness {
    /// Signed-out harness over the sample catalog.
    pub fn new() -> Self {
        Self::build(sample_api(), StubConnector::new, TEST_REDIRECT_URI)
    }

    pub fn with_api(api: StubSpotifyApi) -> Self {
        Self::build(api, StubConnector::new, TEST_REDIRECT_URI)
    }

    /// Customize the token endpoint stand-in.
    pub fn with_connector(make: impl FnOnce(Arc<StubSpotifyApi>) -> StubConnector) -> Self {
        Self::build(sample_api(), make, TEST_REDIRECT_URI)
    }

    /// Signed-out harness whose listener binds where `redirect_uri` says.
    pub fn with_redirect_uri(redirect_uri: &str) -> Self {
        Self::build(sample_api(), StubConnector::new, redirect_uri)
    }

    /// Harness with a session established through the redirect path.
    pub async fn signed_in() -> Self {
        let harness = Self::new();
        harness.sign_in().await;
        harness
    }

    fn build(
        api: StubSpotifyApi,
        make: impl FnOnce(Arc<StubSpotifyApi>) -> StubConnector,
        redirect_uri: &str,
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for token cache");
        let api = Arc::new(api);
        let connector = Arc::new(make(Arc::clone(&api)));
        let opener = Arc::new(RecordingOpener::new());
        let auth = manager(
            temp_dir.path().join("token_cache.json"),
            redirect_uri,
            connector.clone(),
            opener.clone(),
        );
        let dispatcher = ToolDispatcher::new(auth.clone()).with_follow_up_delay(Duration::ZERO);
        Self {
            api,
            connector,
            opener,
            auth,
            dispatcher,
            temp_dir,
            redirect_uri: redirect_uri.to_string(),
        }
    }

    pub fn cache_path(&self) -> PathBuf {
        self.temp_dir.path().join("token_cache.json")
    }

    pub async fn sign_in(&self) {
        self.auth
            .complete_from_redirect("http://127.0.0.1/callback?code=test-code")
            .await
            .expect("stub exchange should succeed");
    }

    /// A second manager over the same cache file, as a new process would see it.
    pub fn reopen(&self) -> AuthManager {
        manager(
            self.cache_path(),
            &self.redirect_uri,
            self.connector.clone(),
            Arc::new(RecordingOpener::new()),
        )
    }

    /// Invoke `name` with a JSON object of arguments.
    pub async fn call(&self, name: &str, args: Value) -> ToolResult {
        let mut request = ToolRequest::new(name);
        if let Value::Object(map) = args {
            request.arguments = map;
        }
        self.dispatcher.invoke(request).await
    }
}

fn manager(
    cache_path: PathBuf,
    redirect_uri: &str,
    connector: Arc<StubConnector>,
    opener: Arc<RecordingOpener>,
) -> AuthManager {
    let config = SpotifyConfig::new(
        Some("test-client".to_string()),
        Some("test-secret".to_string()),
        Some(redirect_uri.to_string()),
        Some(cache_path),
    )
    .expect("test config is valid");
    AuthManager::new(config, connector, opener)
}
