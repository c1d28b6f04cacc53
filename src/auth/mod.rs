//! OAuth authorization-code flow and session ownership.

pub mod browser;
pub mod cache;
pub mod callback;
pub mod connector;
pub mod manager;

pub use browser::{RecordingOpener, SystemOpener, UrlOpener};
pub use cache::TokenCache;
pub use callback::ListenerHandle;
pub use connector::{Connector, TokenInfo};
pub use manager::{AuthEvent, AuthManager, AuthOutcome, PendingAuthorization, Session, SessionStatus};
