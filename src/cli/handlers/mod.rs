//! CLI command handlers.

pub mod call;
pub mod completions;
pub mod login;
pub mod menu;
pub mod status;
pub mod tools;
