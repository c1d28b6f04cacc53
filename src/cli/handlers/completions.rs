//! Shell completion generation.

use clap::CommandFactory;

use crate::cli::Cli;

pub fn handle_completions(shell: clap_complete::Shell) {
    clap_complete::generate(shell, &mut Cli::command(), "spotify-mcp", &mut std::io::stdout());
}
