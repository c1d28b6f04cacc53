pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod init;
pub mod mcp;
pub mod spotify;
pub mod tools;
pub mod utils;

pub use error::{AuthError, ConfigError, RemoteError, ValidationError};
