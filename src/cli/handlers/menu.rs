//! Interactive numbered menu over the tool dispatcher.

use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::cli::output::print_outcome;
use crate::init::AppContext;
use crate::tools::{ToolRequest, AUTHENTICATE};

/// Menu entries in display order; the number shown is the index plus one.
pub const MENU: [&str; 13] = [
    "Authenticate Spotify",
    "Play a Song",
    "Pause Playback",
    "Resume Playback",
    "Next Track",
    "Previous Track",
    "Set Volume",
    "Create Playlist",
    "Add to Playlist",
    "Search Songs",
    "Show Current Playback",
    "List Playlists",
    "Exit",
];

const SEARCH_TYPE_CHOICES: &[&str] = &["track", "artist", "album", "playlist"];
const YES_NO: &[&str] = &["yes", "no"];

/// What the user picked.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    Invoke(ToolRequest),
    Invalid,
    Exit,
}

/// Line-oriented prompts. End of input reads as `None`.
pub struct Prompter<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R: AsyncBufRead + Unpin, W: Write> Prompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Ask once; a blank answer takes `default` when one is given.
    pub async fn ask(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>> {
        match default {
            Some(d) if !d.is_empty() => write!(self.out, "{} ({}): ", label, d)?,
            _ => write!(self.out, "{}: ", label)?,
        }
        self.out.flush()?;

        let Some(line) = self.lines.next_line().await? else {
            return Ok(None);
        };
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(Some(default.unwrap_or_default().to_string()));
        }
        Ok(Some(answer.to_string()))
    }

    /// Ask until the answer is one of `choices`.
    pub async fn ask_choice(
        &mut self,
        label: &str,
        choices: &[&str],
        default: &str,
    ) -> Result<Option<String>> {
        let label = format!("{} [{}]", label, choices.join("/"));
        loop {
            let Some(answer) = self.ask(&label, Some(default)).await? else {
                return Ok(None);
            };
            let answer = answer.to_lowercase();
            if choices.contains(&answer.as_str()) {
                return Ok(Some(answer));
            }
            writeln!(self.out, "Please select one of the available options")?;
        }
    }

    /// Wait for Enter.
    pub async fn pause(&mut self) -> Result<()> {
        write!(self.out, "\nPress Enter to return to menu...")?;
        self.out.flush()?;
        self.lines.next_line().await?;
        Ok(())
    }

    pub fn print_menu(&mut self) -> Result<()> {
        writeln!(self.out, "\n{}\n", "Spotify-MCP CLI".green().bold())?;
        for (i, item) in MENU.iter().enumerate() {
            writeln!(self.out, "[{}] {}", i + 1, item)?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}

/// Integer answers go through as numbers so the validator sees the real type.
fn number_or_text(answer: String) -> Value {
    answer
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or(Value::String(answer))
}

/// Optional text answers are omitted when blank.
fn optional(request: ToolRequest, key: &str, answer: String) -> ToolRequest {
    if answer.is_empty() {
        request
    } else {
        request.arg(key, answer)
    }
}

/// Read a menu choice and any follow-up answers, producing one action.
pub async fn read_action<R, W>(prompter: &mut Prompter<R, W>) -> Result<MenuAction>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    macro_rules! answer {
        ($fut:expr) => {
            match $fut.await? {
                Some(a) => a,
                None => return Ok(MenuAction::Exit),
            }
        };
    }

    let choice = answer!(prompter.ask("Choose an option", None));
    let Ok(choice) = choice.parse::<usize>() else {
        return Ok(MenuAction::Invalid);
    };

    let request = match choice {
        1 => ToolRequest::new(AUTHENTICATE),
        2 => {
            let title = answer!(prompter.ask("Enter song title", None));
            let artist = answer!(prompter.ask("Enter artist (optional)", Some("")));
            optional(ToolRequest::new("play_song").arg("song_title", title), "artist", artist)
        }
        3 => ToolRequest::new("pause_playback"),
        4 => ToolRequest::new("resume_playback"),
        5 => ToolRequest::new("skip_track"),
        6 => ToolRequest::new("previous_track"),
        7 => {
            let volume = answer!(prompter.ask("Volume (0-100)", Some("50")));
            ToolRequest::new("set_volume").arg("volume_percent", number_or_text(volume))
        }
        8 => {
            let name = answer!(prompter.ask("Playlist name", None));
            let public = answer!(prompter.ask_choice("Make public?", YES_NO, "yes"));
            ToolRequest::new("create_playlist")
                .arg("playlist_name", name)
                .arg("public", public == "yes")
        }
        9 => {
            let song = answer!(prompter.ask("Song title", None));
            let playlist = answer!(prompter.ask("Playlist name", None));
            let artist = answer!(prompter.ask("Artist (optional)", Some("")));
            optional(
                ToolRequest::new("add_to_playlist")
                    .arg("song_title", song)
                    .arg("playlist_name", playlist),
                "artist",
                artist,
            )
        }
        10 => {
            let query = answer!(prompter.ask("Search query", None));
            let search_type = answer!(prompter.ask_choice("Type", SEARCH_TYPE_CHOICES, "track"));
            let limit = answer!(prompter.ask("Limit (1-50)", Some("5")));
            ToolRequest::new("search_songs")
                .arg("query", query)
                .arg("search_type", search_type)
                .arg("limit", number_or_text(limit))
        }
        11 => ToolRequest::new("get_current_playback_info"),
        12 => ToolRequest::new("get_user_playlists"),
        13 => return Ok(MenuAction::Exit),
        _ => return Ok(MenuAction::Invalid),
    };
    Ok(MenuAction::Invoke(request))
}

pub async fn handle_menu(ctx: &AppContext) -> Result<()> {
    let first = ctx.dispatcher.invoke(ToolRequest::new(AUTHENTICATE)).await;
    print_outcome(&first.text(), first.is_error);

    let mut prompter = Prompter::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    loop {
        prompter.print_menu()?;
        match read_action(&mut prompter).await? {
            MenuAction::Exit => {
                println!("{}", "Exiting...".red().bold());
                break;
            }
            MenuAction::Invalid => print_outcome("Invalid option", false),
            MenuAction::Invoke(request) => {
                let result = ctx.dispatcher.invoke(request).await;
                for segment in &result.segments {
                    print_outcome(segment, result.is_error);
                }
            }
        }
        prompter.pause().await?;
    }

    ctx.auth.stop_callback_listener().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn action_for(input: &str) -> (MenuAction, String) {
        let mut prompter = Prompter::new(input.as_bytes(), Vec::new());
        let action = read_action(&mut prompter).await.unwrap();
        let out = String::from_utf8(prompter.into_output()).unwrap();
        (action, out)
    }

    fn invoked(action: MenuAction) -> ToolRequest {
        match action {
            MenuAction::Invoke(request) => request,
            other => panic!("expected a tool request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_play_song_without_artist() {
        let (action, out) = action_for("2\nHey Jude\n\n").await;
        let request = invoked(action);
        assert_eq!(request.name, "play_song");
        assert_eq!(request.arguments["song_title"], json!("Hey Jude"));
        assert!(!request.arguments.contains_key("artist"));
        assert!(out.contains("Enter song title: "));
    }

    #[tokio::test]
    async fn test_volume_default_and_number() {
        let request = invoked(action_for("7\n\n").await.0);
        assert_eq!(request.arguments["volume_percent"], json!(50));

        let request = invoked(action_for("7\nloud\n").await.0);
        assert_eq!(request.arguments["volume_percent"], json!("loud"));
    }

    #[tokio::test]
    async fn test_create_playlist_reasks_until_valid_choice() {
        let (action, out) = action_for("8\nFocus\nmaybe\nno\n").await;
        let request = invoked(action);
        assert_eq!(request.arguments["playlist_name"], json!("Focus"));
        assert_eq!(request.arguments["public"], json!(false));
        assert!(out.contains("Please select one of the available options"));
    }

    #[tokio::test]
    async fn test_search_defaults() {
        let request = invoked(action_for("10\njazz\n\n\n").await.0);
        assert_eq!(request.name, "search_songs");
        assert_eq!(request.arguments["search_type"], json!("track"));
        assert_eq!(request.arguments["limit"], json!(5));
    }

    #[tokio::test]
    async fn test_add_to_playlist_with_artist() {
        let request = invoked(action_for("9\nYesterday\nOldies\nThe Beatles\n").await.0);
        assert_eq!(request.name, "add_to_playlist");
        assert_eq!(request.arguments["artist"], json!("The Beatles"));
    }

    #[tokio::test]
    async fn test_invalid_exit_and_eof() {
        assert_eq!(action_for("42\n").await.0, MenuAction::Invalid);
        assert_eq!(action_for("two\n").await.0, MenuAction::Invalid);
        assert_eq!(action_for("13\n").await.0, MenuAction::Exit);
        assert_eq!(action_for("").await.0, MenuAction::Exit);
        assert_eq!(action_for("2\n").await.0, MenuAction::Exit);
    }

    #[test]
    fn test_menu_numbering() {
        assert_eq!(MENU.len(), 13);
        assert_eq!(MENU[0], "Authenticate Spotify");
        assert_eq!(MENU[12], "Exit");
    }
}
