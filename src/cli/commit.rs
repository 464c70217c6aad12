//! The `commit` and `add` subcommands.

use std::{fmt::Display, str::FromStr};

use anyhow::Context;

use crate::cli::Session;

pub(crate) const TICKET_QUESTION: &str = "Is this commit related to any projects tickets / Components / features (eg: JIRA-124, button, vpc): ";

// =============================================================================
// Domain Types
// =============================================================================

/// What a commit did to the code base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommitOperation {
    Add,
    Update,
    Del,
}

impl FromStr for CommitOperation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "add" => Ok(CommitOperation::Add),
            "update" => Ok(CommitOperation::Update),
            "del" => Ok(CommitOperation::Del),
            other => anyhow::bail!("Operation {other} not understood."),
        }
    }
}

impl Display for CommitOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitOperation::Add => write!(f, "add"),
            CommitOperation::Update => write!(f, "update"),
            CommitOperation::Del => write!(f, "del"),
        }
    }
}

/// `<operation>(<ticket>): <description>`
pub fn format_commit_message(
    operation: CommitOperation,
    ticket: &str,
    description: &str,
) -> String {
    format!("{operation}({}): {}", ticket.trim(), description.trim())
}

// =============================================================================
// Command Logic
// =============================================================================

/// Stages every change in the working tree.
pub fn stage_all(session: &mut Session<'_>) -> anyhow::Result<()> {
    session.git.stage_all().context("Failed to stage changes")
}

/// Asks for ticket, operation and description, then stages everything and
/// commits with a structured message.
pub fn commit(session: &mut Session<'_>) -> anyhow::Result<()> {
    let ticket = session.terminal.ask(TICKET_QUESTION)?;
    let operation: CommitOperation = session
        .terminal
        .ask("Enter which git operation did you performed (eg: add, update, del): ")?
        .parse()?;

    session.terminal.say("Files modified")?;

    let status = session
        .git
        .status()
        .context("Failed to show the working tree status")?;

    session.terminal.write(&status)?;

    let description = session
        .terminal
        .ask_raw(&format!("What did you {operation}: "))?;

    if session.settings.is_commit_message_too_short(&description) {
        session.terminal.say(format!(
            "COMMIT MESSAGE TOO SHORT. COMMIT MESSAGE SHOULD BE AT LEAST {} CHARS LONG.",
            session.settings.min_commit_message_length
        ))?;
    }

    session.unprotected_branch("commit")?;
    session.git.stage_all().context("Failed to stage changes")?;

    let message = format_commit_message(operation, &ticket, &description);

    session.git.commit(&message).context("Failed to commit")?;
    session.terminal.say(format!("Committed \"{message}\""))
}
