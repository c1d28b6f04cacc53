//! Session status.

use crate::cli::output::{output_json, print_header, print_hint, print_kv, OutputMode};
use crate::init::AppContext;

pub async fn handle_status(ctx: &AppContext, mode: OutputMode) {
    let status = ctx.auth.session_status();
    let listener = ctx.auth.listener_addr().await;

    match mode {
        OutputMode::Json => output_json(&status),
        OutputMode::Human => {
            print_header("Spotify session");
            print_kv("Token loaded", yes_no(status.has_token));
            print_kv("Token valid", yes_no(status.token_is_valid));
            print_kv("Cache", &ctx.auth.config().cache_path.display().to_string());
            print_kv("Redirect URI", ctx.auth.config().redirect_uri.as_str());
            if let Some(addr) = listener {
                print_kv("Callback listener", &addr.to_string());
            }
            if !status.has_token {
                print_hint("Run `spotify-mcp login` to sign in.");
            }
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
