//! One-shot tool invocation.

use anyhow::Result;
use serde_json::Value;

use crate::cli::output::{output_json, print_hint, print_outcome, OutputMode};
use crate::init::AppContext;
use crate::tools::{find, ParamKind, ToolRequest, AUTHENTICATE};

pub async fn handle_call(
    ctx: &AppContext,
    tool: &str,
    args: &[(String, String)],
    mode: OutputMode,
) -> Result<()> {
    let request = build_request(tool, args);
    let result = ctx.dispatcher.invoke(request).await;

    match mode {
        OutputMode::Json => output_json(&result),
        OutputMode::Human => {
            print_outcome(&result.text(), result.is_error);
            if tool == AUTHENTICATE && ctx.auth.pending_authorization().await.is_some() {
                print_hint("Run `spotify-mcp login` to wait for the browser redirect.");
            }
        }
    }

    if result.is_error {
        anyhow::bail!("{} did not complete", tool);
    }
    Ok(())
}

/// Turn `key=value` pairs into a request. Integer and boolean parameters
/// take JSON values; everything else is passed through as a string.
pub fn build_request(tool: &str, args: &[(String, String)]) -> ToolRequest {
    let descriptor = find(tool);
    args.iter()
        .fold(ToolRequest::new(tool), |request, (key, raw)| {
            let textual = descriptor
                .and_then(|d| d.param(key))
                .map(|p| matches!(p.kind, ParamKind::String | ParamKind::Enum { .. }))
                .unwrap_or(false);
            let value = if textual {
                Value::String(raw.clone())
            } else {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
            };
            request.arg(key, value)
        })
}
