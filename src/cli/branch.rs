//! The `branch` subcommand.

use anyhow::Context;

use crate::cli::{Session, commit::TICKET_QUESTION};

/// `<kind>/<ticket>/<work>` with every space turned into a hyphen.
pub fn compose_branch_name(kind: &str, ticket: &str, work: &str) -> String {
    format!("{}/{}/{}", kind.trim(), ticket.trim(), work.trim()).replace(' ', "-")
}

/// Asks what the branch is for and creates and checks it out.
pub fn create_branch(session: &mut Session<'_>) -> anyhow::Result<()> {
    let ticket = session.terminal.ask(TICKET_QUESTION)?;
    let kind = session
        .terminal
        .ask("What kind of work is this (eg: bugfix, feat, demo, test): ")?;
    let work = session
        .terminal
        .ask("What work will be done in this branch: ")?;
    let branch_name = compose_branch_name(&kind, &ticket, &work);

    session
        .git
        .create_branch(&branch_name)
        .with_context(|| format!("Failed to create branch \"{branch_name}\""))?;

    session
        .terminal
        .say(format!("Switched to a new branch \"{branch_name}\""))
}
