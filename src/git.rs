//! Git operations and utilities.

use std::{path::PathBuf, process::Command};

use anyhow::Context;
#[cfg(test)]
use mockall::automock;
use tracing::debug;

// =============================================================================
// GitOps trait
// =============================================================================

/// Operations `bc` needs from the git CLI.
///
/// Every call that can fail reports the failure, mutating ones included.
#[cfg_attr(test, automock)]
pub trait GitOps {
    /// Whether git accepts the current directory as part of a repository.
    fn is_inside_work_tree(&self) -> bool;

    /// Name of the checked-out branch.
    fn current_branch(&self) -> anyhow::Result<String>;

    /// Human-readable `git status` output.
    fn status(&self) -> anyhow::Result<String>;

    /// Machine-readable `git status --porcelain` output.
    fn status_porcelain(&self) -> anyhow::Result<String>;

    /// Stages every change in the working tree.
    fn stage_all(&self) -> anyhow::Result<()>;

    fn commit(&self, message: &str) -> anyhow::Result<()>;

    /// Creates a branch and checks it out.
    fn create_branch(&self, name: &str) -> anyhow::Result<()>;

    fn push_with_upstream(&self, remote: &str, branch: &str) -> anyhow::Result<()>;

    /// Configured URL of a remote.
    fn remote_url(&self, remote: &str) -> anyhow::Result<String>;

    /// Whether `branch` exists on `remote`.
    fn remote_branch_exists(&self, remote: &str, branch: &str) -> anyhow::Result<bool>;

    /// Every remote as listed by `git remote -v`.
    fn remotes(&self) -> anyhow::Result<Vec<GitRemote>>;

    /// Absolute path of the repository root.
    fn repo_root(&self) -> anyhow::Result<PathBuf>;
}

// =============================================================================
// SystemGit
// =============================================================================

/// Implementation that shells out to the `git` binary.
pub struct SystemGit;

impl SystemGit {
    fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        debug!(?args, "running git");

        let output = Command::new("git")
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

        if !output.status.success() {
            anyhow::bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl GitOps for SystemGit {
    fn is_inside_work_tree(&self) -> bool {
        self.run(&["rev-parse", "--is-inside-work-tree"]).is_ok()
    }

    fn current_branch(&self) -> anyhow::Result<String> {
        let branch = self
            .run(&["rev-parse", "--abbrev-ref", "HEAD"])
            .context("Failed to get current branch")?;
        let branch = branch.trim();

        if branch.is_empty() {
            anyhow::bail!("No branch checked out.");
        }

        Ok(branch.to_string())
    }

    fn status(&self) -> anyhow::Result<String> {
        self.run(&["status"])
    }

    fn status_porcelain(&self) -> anyhow::Result<String> {
        self.run(&["status", "--porcelain"])
    }

    fn stage_all(&self) -> anyhow::Result<()> {
        self.run(&["add", "."]).map(|_| ())
    }

    fn commit(&self, message: &str) -> anyhow::Result<()> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    fn create_branch(&self, name: &str) -> anyhow::Result<()> {
        self.run(&["checkout", "-b", name]).map(|_| ())
    }

    fn push_with_upstream(&self, remote: &str, branch: &str) -> anyhow::Result<()> {
        self.run(&["push", "--set-upstream", remote, branch])
            .map(|_| ())
    }

    fn remote_url(&self, remote: &str) -> anyhow::Result<String> {
        let key = format!("remote.{remote}.url");
        let url = self
            .run(&["config", "--get", &key])
            .with_context(|| format!("No URL configured for remote '{remote}'"))?;

        Ok(url.trim().to_string())
    }

    fn remote_branch_exists(&self, remote: &str, branch: &str) -> anyhow::Result<bool> {
        let head_ref = format!("refs/heads/{branch}");
        let heads = self.run(&["ls-remote", "--heads", remote, &head_ref])?;

        Ok(lists_ref(&heads, &head_ref))
    }

    fn remotes(&self) -> anyhow::Result<Vec<GitRemote>> {
        let listing = self.run(&["remote", "-v"])?;

        parse_remote_listing(&listing)
    }

    fn repo_root(&self) -> anyhow::Result<PathBuf> {
        let root = self.run(&["rev-parse", "--show-toplevel"])?;
        let root = root.trim();

        if root.is_empty() {
            anyhow::bail!("git reported an empty repository root");
        }

        Ok(PathBuf::from(root))
    }
}

/// Whether `git ls-remote` output names exactly `full_ref`.
///
/// git matches ls-remote patterns against ref suffixes, so `login` would also
/// hit `refs/heads/feat/login`.
fn lists_ref(ls_remote: &str, full_ref: &str) -> bool {
    ls_remote
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|name| name == full_ref)
}

// =============================================================================
// Remote listing
// =============================================================================

/// Whether a `git remote -v` entry is used for fetching or pushing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RemoteDirection {
    Fetch,
    Push,
}

/// One line of `git remote -v`.
#[derive(Clone, Debug, PartialEq)]
pub struct GitRemote {
    pub name: String,
    pub url: String,
    pub direction: RemoteDirection,
}

/// Parses `git remote -v` output, e.g. `origin\tgit@host:o/r.git (fetch)`.
///
/// # Errors
///
/// Returns an error for any non-empty line that doesn't have the
/// `<name> <url> (fetch|push)` shape.
pub fn parse_remote_listing(listing: &str) -> anyhow::Result<Vec<GitRemote>> {
    listing
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [name, url, direction] = fields.as_slice() else {
                anyhow::bail!("Unexpected line in git remote listing: {line}");
            };
            let direction = match *direction {
                "(fetch)" => RemoteDirection::Fetch,
                "(push)" => RemoteDirection::Push,
                other => anyhow::bail!("Unknown remote direction {other} in line: {line}"),
            };

            Ok(GitRemote {
                name: name.to_string(),
                url: url.to_string(),
                direction,
            })
        })
        .collect()
}

/// Finds the fetch URL of `name`, falling back to its push URL.
pub fn find_remote<'a>(remotes: &'a [GitRemote], name: &str) -> Option<&'a GitRemote> {
    let mut candidates = remotes.iter().filter(|remote| remote.name == name);
    let first = candidates.next()?;

    if first.direction == RemoteDirection::Fetch {
        return Some(first);
    }

    candidates
        .find(|remote| remote.direction == RemoteDirection::Fetch)
        .or(Some(first))
}

// =============================================================================
// Remote URLs
// =============================================================================

/// Parsed data from a git remote URL.
#[derive(Debug, PartialEq)]
pub struct GitRemoteData {
    /// The hostname (e.g., "github.com").
    pub host: String,
    /// The repository path (e.g., "owner/repo").
    pub path: String,
    /// The port number, if specified in the URL.
    pub port: Option<u16>,
}

impl GitRemoteData {
    /// Owner of the repository, i.e. the first path segment.
    pub fn owner(&self) -> Option<&str> {
        self.path.split('/').next().filter(|owner| !owner.is_empty())
    }

    /// The HTTPS URL of the repository's home page.
    pub fn web_url(&self) -> String {
        let (host, path) = (&self.host, &self.path);

        match self.port {
            Some(port) => format!("https://{host}:{port}/{path}"),
            None => format!("https://{host}/{path}"),
        }
    }
}

/// Parses a git remote URL into its components.
///
/// Supports the following URL formats:
/// - HTTPS: `https://<host>[:<port>]/<owner>/<repo>.git`
/// - SSH: `ssh://git@<host>[:<port>]/<owner>/<repo>.git`
/// - Git SSH: `git@<host>:<owner>/<repo>.git` (port not supported in this format)
pub fn parse_remote_url(url: &str) -> Option<GitRemoteData> {
    if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("ssh://git@"))
    {
        let (authority, path) = rest.split_once('/')?;
        let (host, port) = parse_host_port(authority)?;

        return Some(GitRemoteData {
            host,
            path: strip_git_suffix(path),
            port,
        });
    }

    let (host, path) = url.strip_prefix("git@")?.split_once(':')?;

    Some(GitRemoteData {
        host: host.to_string(),
        path: strip_git_suffix(path),
        port: None,
    })
}

fn strip_git_suffix(path: &str) -> String {
    path.strip_suffix(".git").unwrap_or(path).to_string()
}

fn parse_host_port(authority: &str) -> Option<(String, Option<u16>)> {
    match authority.rsplit_once(':') {
        Some((host, port)) => Some((host.to_string(), Some(port.parse().ok()?))),
        None => Some((authority.to_string(), None)),
    }
}
