mod forge {
    pub mod github;
    pub mod http_client;
}

mod branch;
mod browse;
mod commit;
mod config;
mod pr;
mod push;

pub use branch::create_branch;
pub use browse::{SystemBrowser, open_repository};
pub use commit::{commit, stage_all};
pub use config::Settings;
pub use forge::github::GitHubClient;
pub use pr::create_pr;
pub use push::push;

use clap::{Parser, Subcommand};

use crate::{git::GitOps, io::Terminal};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USAGE: &str = r#"
BetterCommit (bc) is a small utility which will help you make a habit of writing better commit messages.

Usage: bc <subcommand>

Available commands:
    add         Adds all the changes to staging area
    commit      Adds and commits all the changes
    branch      Creates a new branch
    push        Pushes the current branch to the remote
    pr          Creates a new pull request
    open        Open relevant repo in browser
    help        Show this message
    version     Show current version

Example usage:

    $ bc open
"#;

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Parser)]
#[command(
    name = "bc",
    version,
    about = "Nudges you towards disciplined commits, branch names and pull requests",
    long_about = None,
    disable_help_subcommand = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub subcommand: BcCommand,
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum BcCommand {
    /// Adds all the changes to staging area.
    Add,

    /// Adds and commits all the changes with a structured message.
    Commit,

    /// Creates a new branch named <kind>/<ticket>/<work>.
    Branch,

    /// Pushes the current branch to the remote.
    Push,

    /// Opens the repository in the browser.
    Open,

    /// Creates a new pull request.
    Pr,

    /// Shows usage.
    Help,

    /// Shows the current version.
    Version,
}

// =============================================================================
// Session
// =============================================================================

/// Everything a command needs to talk to the user and to git.
pub struct Session<'a> {
    pub settings: &'a Settings,
    pub git: &'a dyn GitOps,
    pub terminal: Terminal<'a>,
}

impl Session<'_> {
    /// Returns the current branch unless it is protected.
    ///
    /// `action` completes "Not recommended to ... to <branches> branch".
    pub(crate) fn unprotected_branch(&self, action: &str) -> anyhow::Result<String> {
        let branch = self.git.current_branch()?;

        if self.settings.is_protected(&branch) {
            anyhow::bail!(
                "Not recommended to {action} to {} branch. Please create a new branch using \"bc branch\"",
                self.settings.protected_branches_display()
            );
        }

        Ok(branch)
    }
}

pub fn print_usage(session: &mut Session<'_>) -> anyhow::Result<()> {
    session.terminal.say(USAGE)
}

pub fn print_version(session: &mut Session<'_>) -> anyhow::Result<()> {
    session.terminal.say(VERSION)
}

/// Runs `flow` against in-memory input and returns its result together with
/// everything it printed.
#[cfg(test)]
pub(crate) fn run_flow(
    git: &dyn GitOps,
    settings: &Settings,
    input: &str,
    flow: impl FnOnce(&mut Session<'_>) -> anyhow::Result<()>,
) -> (anyhow::Result<()>, String) {
    let mut input = std::io::Cursor::new(input.as_bytes().to_vec());
    let mut output = Vec::new();
    let result = {
        let mut session = Session {
            settings,
            git,
            terminal: Terminal::new(&mut input, &mut output),
        };

        flow(&mut session)
    };

    (result, String::from_utf8_lossy(&output).into_owned())
}
