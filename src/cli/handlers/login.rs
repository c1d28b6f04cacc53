//! Interactive sign-in: start the authorization flow and wait for it to finish.

use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::auth::AuthEvent;
use crate::cli::output::{output_json, print_error, print_hint, print_success, OutputMode};
use crate::init::AppContext;

pub async fn handle_login(ctx: &AppContext, timeout_secs: u64, mode: OutputMode) -> Result<()> {
    let mut events = ctx.auth.subscribe();
    let outcome = ctx.auth.authenticate().await?;

    if outcome.authorize_url().is_none() {
        match mode {
            OutputMode::Json => output_json(&ctx.auth.session_status()),
            OutputMode::Human => println!("{}", outcome),
        }
        return Ok(());
    }

    if mode == OutputMode::Human {
        println!("{}\n", outcome);
        print_hint(&format!(
            "Waiting up to {}s. You can also paste the address you were redirected to and press Enter.",
            timeout_secs
        ));
    }

    // Ignore a session hydrated from the cache before the browser flow started.
    let _ = events.borrow_and_update();

    let deadline = tokio::time::sleep(Duration::from_secs(timeout_secs));
    tokio::pin!(deadline);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let result = loop {
        tokio::select! {
            changed = events.changed() => {
                if changed.is_err() {
                    break Err(anyhow::anyhow!("Authorization was abandoned"));
                }
                let event = events.borrow_and_update().clone();
                match event {
                    AuthEvent::SignedIn => break Ok(()),
                    AuthEvent::CallbackFailed(e) => {
                        break Err(anyhow::anyhow!("Sign-in failed: {}", e));
                    }
                    AuthEvent::Idle => {}
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match ctx.auth.complete_from_redirect(&line).await {
                        Ok(_) => break Ok(()),
                        Err(e) => print_error(&e.to_string()),
                    },
                    Ok(None) | Err(_) => stdin_open = false,
                }
            }
            _ = &mut deadline => {
                break Err(anyhow::anyhow!(
                    "Timed out after {}s waiting for the Spotify redirect",
                    timeout_secs
                ));
            }
        }
    };

    ctx.auth.stop_callback_listener().await;
    result?;

    match mode {
        OutputMode::Json => output_json(&ctx.auth.session_status()),
        OutputMode::Human => {
            let who = match ctx.auth.current_session() {
                Some(session) => session.client().current_user().await.ok(),
                None => None,
            };
            match who.and_then(|u| u.display_name.filter(|n| !n.is_empty()).or(Some(u.id))) {
                Some(name) => print_success(&format!("Signed in to Spotify as {}", name)),
                None => print_success("Signed in to Spotify"),
            }
        }
    }
    Ok(())
}
