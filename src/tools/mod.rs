//! Tool catalog and dispatch.
//!
//! `ToolDispatcher::invoke` is the single entry point for both front-ends:
//! it checks the session, validates arguments against the catalog, performs
//! the remote call(s) and folds every outcome into one `ToolResult`.

pub mod catalog;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod types;
pub mod validate;

pub use catalog::{find, list_tools, ParamKind, ParamSpec, RangePolicy, ToolDescriptor, AUTHENTICATE};
pub use dispatcher::{ToolDispatcher, DEFAULT_FOLLOW_UP_DELAY};
pub use error::ToolError;
pub use types::{ToolCall, ToolRequest, ToolResult};
