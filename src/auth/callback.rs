//! Local HTTP listener receiving the OAuth redirect.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::manager::AuthManager;
use crate::error::AuthError;

/// Running listener. Aborts its server task when dropped.
///
/// The server task holds an [`AuthManager`] clone, and that manager owns
/// this handle, so dropping the last outside clone does not stop it. Call
/// [`AuthManager::stop_callback_listener`] to shut it down.
#[derive(Debug)]
pub struct ListenerHandle {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Ordered `(host, port)` bind attempts.
///
/// The redirect host comes first, then `localhost`, on the same port.
pub fn bind_candidates(host: Option<&str>, port: u16) -> Vec<(String, u16)> {
    let mut hosts = Vec::with_capacity(2);
    if let Some(host) = host {
        hosts.push(host.to_string());
    }
    if !hosts.iter().any(|h| h == "localhost") {
        hosts.push("localhost".to_string());
    }
    hosts.into_iter().map(|h| (h, port)).collect()
}

/// Try each candidate in order, stopping at the first successful bind.
pub async fn bind_first(candidates: &[(String, u16)]) -> Option<TcpListener> {
    for (host, port) in candidates {
        match TcpListener::bind((host.as_str(), *port)).await {
            Ok(listener) => return Some(listener),
            Err(e) => warn!(host = %host, port, error = %e, "Callback bind failed"),
        }
    }
    error!("Could not bind callback listener on any candidate address");
    None
}

/// Serve the callback route on `listener` in a background task.
pub fn serve(listener: TcpListener, path: &str, auth: AuthManager) -> Option<ListenerHandle> {
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(error = %e, "Callback listener has no local address");
            return None;
        }
    };
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    let app = Router::new()
        .route(&path, get(callback))
        .with_state(auth);

    info!(addr = %addr, path = %path, "Callback listener started");
    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Callback listener exited: {e:#}");
        }
    });

    Some(ListenerHandle { addr, task })
}

async fn callback(
    State(auth): State<AuthManager>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match auth.handle_redirect(&params).await {
        Ok(session) => {
            let name = session
                .client()
                .current_user()
                .await
                .ok()
                .map(|u| u.display_name.filter(|d| !d.is_empty()).unwrap_or(u.id));
            (StatusCode::OK, Html(success_page(name.as_deref()))).into_response()
        }
        Err(e) => {
            let (status, body) = failure_response(&e);
            (status, body).into_response()
        }
    }
}

/// Status and plain-text body for a failed redirect.
pub fn failure_response(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::Provider(code) => (
            StatusCode::BAD_REQUEST,
            format!("❌ Authentication error: {}", code),
        ),
        AuthError::InvalidCallback => (
            StatusCode::BAD_REQUEST,
            "❌ Invalid callback request".to_string(),
        ),
        AuthError::ExchangeRejected(_) => (StatusCode::BAD_REQUEST, format!("❌ {}", err)),
        AuthError::Transport(_) | AuthError::Cache(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("❌ Callback error: {}", err),
        ),
    }
}

fn success_page(name: Option<&str>) -> String {
    let heading = match name {
        Some(name) => format!("✅ Successfully authenticated as {}!", escape_html(name)),
        None => "✅ Successfully authenticated!".to_string(),
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Spotify MCP</title></head>\n\
         <body>\n<h2>{}</h2>\n<p>You can close this window and return to your application.</p>\n\
         <script>setTimeout(() => window.close(), 3000);</script>\n</body>\n</html>\n",
        heading
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
