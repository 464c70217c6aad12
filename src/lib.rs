mod cli;
mod git;
mod io;
mod logging;

use std::ffi::OsString;

use clap::{Parser, error::ErrorKind};

use crate::{
    cli::{BcCommand, Cli, GitHubClient, Session, Settings, SystemBrowser},
    git::{GitOps, SystemGit},
    io::Terminal,
};

const NOT_A_REPO: &str = "This is not a git repo. I am not needed here. Ta Ta !!!";

pub fn run() -> anyhow::Result<()> {
    logging::init();

    let git = SystemGit;

    if !git.is_inside_work_tree() {
        anyhow::bail!(NOT_A_REPO);
    }

    let Some(command) = parse_command(std::env::args_os())? else {
        return Ok(());
    };
    let settings = Settings::load_from_disk()?;
    let mut input = std::io::stdin().lock();
    let mut output = std::io::stdout();
    let mut session = Session {
        settings: &settings,
        git: &git,
        terminal: Terminal::new(&mut input, &mut output),
    };

    match command {
        BcCommand::Add => cli::stage_all(&mut session),
        BcCommand::Commit => cli::commit(&mut session),
        BcCommand::Branch => cli::create_branch(&mut session),
        BcCommand::Push => cli::push(&mut session),
        BcCommand::Open => cli::open_repository(&mut session, &SystemBrowser),
        BcCommand::Pr => cli::create_pr(&mut session, &GitHubClient::new()),
        BcCommand::Help => cli::print_usage(&mut session),
        BcCommand::Version => cli::print_version(&mut session),
    }
}

/// Parses the command line. `None` means clap already printed help or the
/// version because of `--help` or `--version`.
///
/// Only the first argument picks the command; anything after it is ignored.
fn parse_command<I, T>(args: I) -> anyhow::Result<Option<BcCommand>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args.into_iter().take(2)) {
        Ok(cli) => Ok(Some(cli.subcommand)),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                e.print()?;

                Ok(None)
            }
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                println!("{}", cli::USAGE);

                anyhow::bail!("Not enough arguments provided.")
            }
            _ => Err(anyhow::Error::new(e)
                .context("Could not understand the command. Try running \"bc help\".")),
        },
    }
}
