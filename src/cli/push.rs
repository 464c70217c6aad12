//! The `push` subcommand.

use anyhow::Context;

use crate::cli::Session;

/// Pushes the current branch and sets its upstream. Asks before pushing with
/// uncommitted changes.
pub fn push(session: &mut Session<'_>) -> anyhow::Result<()> {
    let branch = session.unprotected_branch("push")?;
    let changes = session
        .git
        .status_porcelain()
        .context("Failed to check for uncommitted changes")?;

    if !changes.trim().is_empty() {
        let push_anyway = session.terminal.confirm(
            "There are still changes to be committed. Are you sure you want to push? [y/N] ",
        )?;

        if !push_anyway {
            anyhow::bail!("Please commit the changes using \"bc commit\"");
        }
    }

    let remote = &session.settings.remote;

    session
        .git
        .push_with_upstream(remote, &branch)
        .with_context(|| format!("Failed to push \"{branch}\" to {remote}"))?;

    session
        .terminal
        .say(format!("Pushed \"{branch}\" to {remote}"))
}
