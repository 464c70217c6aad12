//! The `open` subcommand.

use std::process::Command;

use anyhow::Context;
#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::{cli::Session, git};

// =============================================================================
// Browser
// =============================================================================

#[cfg_attr(test, automock)]
pub trait UrlOpener {
    fn open(&self, url: &str) -> anyhow::Result<()>;
}

/// Opens URLs with the operating system's default handler.
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        let mut command = launch_command(std::env::consts::OS, url)?;

        debug!(?command, "launching browser");

        command
            .spawn()
            .with_context(|| format!("Failed to run {:?}", command.get_program()))?;

        Ok(())
    }
}

/// The command that opens `url` in the default browser on `os`, named as in
/// [`std::env::consts::OS`].
///
/// The launchers are fixed per platform: `xdg-open`, `open`, and
/// `rundll32 url.dll,FileProtocolHandler`.
///
/// # Errors
///
/// Returns an error for platforms without a known launcher.
pub fn launch_command(os: &str, url: &str) -> anyhow::Result<Command> {
    let mut command = match os {
        "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Command::new("xdg-open"),
        "macos" => Command::new("open"),
        "windows" => {
            let mut command = Command::new("rundll32");

            command.arg("url.dll,FileProtocolHandler");
            command
        }
        other => anyhow::bail!("Unsupported platform: {other}"),
    };

    command.arg(url);

    Ok(command)
}

// =============================================================================
// Command Logic
// =============================================================================

/// Turns a remote URL into the repository's web URL.
///
/// URLs the remote parser understands (`git@host:path`, `ssh://git@...`,
/// `https://...`) are rebuilt from their parts. Anything else gets the plain
/// rewrite: first `:` to `/`, `git@` to `https://`, trailing `.git` dropped.
pub fn to_browsable_url(remote_url: &str) -> String {
    if let Some(remote) = git::parse_remote_url(remote_url) {
        return remote.web_url();
    }

    let url = remote_url
        .replacen(':', "/", 1)
        .replacen("git@", "https://", 1);

    match url.strip_suffix(".git") {
        Some(stripped) => stripped.to_string(),
        None => url,
    }
}

/// Opens the remote repository's home page in the browser.
pub fn open_repository(session: &mut Session<'_>, opener: &dyn UrlOpener) -> anyhow::Result<()> {
    let remote = &session.settings.remote;
    let remote_url = session
        .git
        .remote_url(remote)
        .with_context(|| format!("Error getting Git repository URL for remote '{remote}'"))?;
    let url = to_browsable_url(&remote_url);

    debug!(%remote_url, %url, "opening repository");

    opener.open(&url)
}
