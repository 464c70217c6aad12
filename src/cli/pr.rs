//! The `pr` subcommand.

use std::path::Path;

use anyhow::Context;

use crate::{
    cli::{
        Session,
        forge::{
            github::{self, ApiResponse, PullRequestApi, PullRequestPayload},
            http_client,
        },
    },
    git::{self, GitRemoteData},
    io,
};

// =============================================================================
// Domain Types
// =============================================================================

/// Everything the user is asked about a new pull request.
#[derive(Debug, Default)]
pub struct PrAnswers {
    pub title: String,
    pub ticket: String,
    pub pr_type: String,
    pub change_type: String,
    pub source_branch: String,
    pub target_branch: String,
    pub description: String,
}

impl PrAnswers {
    /// `<ticket>(<type>): <title>`
    pub fn full_title(&self) -> String {
        format!("{}({}): {}", self.ticket, self.pr_type, self.title)
    }

    pub fn body(&self) -> String {
        format!(
            "# Change Description

{}

-------------------------------------------

# Type of PR

- [X] {}

-------------------------------------------

# Type of Change

- [X] {}

-------------------------------------------

## Checklist before requesting a review
- [X] I have performed a self-review of my code
- [X] I am ready to get this code reviewed
- [X] I have locally tested this code against linting and validating.",
            self.description.trim_end(),
            self.pr_type,
            self.change_type
        )
    }

    pub fn into_payload(self) -> PullRequestPayload {
        PullRequestPayload {
            title: self.full_title(),
            body: self.body(),
            head: self.source_branch,
            base: self.target_branch,
        }
    }
}

// =============================================================================
// Command Logic
// =============================================================================

/// Asks for the pull request details and creates it through the API.
pub fn create_pr(session: &mut Session<'_>, api: &dyn PullRequestApi) -> anyhow::Result<()> {
    let settings = session.settings;
    let remote_name = settings.remote.as_str();
    let current_branch = session
        .git
        .current_branch()
        .context("Could not get current branch name")?;
    let pushed = session
        .git
        .remote_branch_exists(remote_name, &current_branch)
        .with_context(|| format!("Failed to list branches on {remote_name}"))?;

    if !pushed {
        anyhow::bail!(
            "Branch: {current_branch} has not been pushed to {remote_name}. Please push and try again."
        );
    }

    let repo_root = session
        .git
        .repo_root()
        .context("Error getting repository path")?;
    let repository = repository_name(&repo_root)?;
    let remote = remote_data(session, remote_name)?;
    let owner = remote
        .owner()
        .with_context(|| format!("Remote '{remote_name}' has no repository owner in its URL"))?;
    let api_base = match settings.api_url.as_deref() {
        Some(url) => url.to_string(),
        None => github::api_base_url(&remote),
    };
    let endpoint = github::pulls_endpoint(&api_base, owner, &repository)?;

    let answers = ask_pr_details(session, &current_branch)?;
    let token = http_client::read_token(&settings.token_env_var)?;
    let response = api.create_pull_request(&endpoint, &answers.into_payload(), &token)?;

    report_response(session, &response)
}

/// Last component of the repository root, e.g. `repo` for `/home/me/repo`.
fn repository_name(repo_root: &Path) -> anyhow::Result<String> {
    repo_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Can't derive a repository name from {}", repo_root.display()))
}

fn remote_data(session: &Session<'_>, remote_name: &str) -> anyhow::Result<GitRemoteData> {
    let remotes = session
        .git
        .remotes()
        .context("Error getting remote information")?;
    let remote = git::find_remote(&remotes, remote_name)
        .with_context(|| format!("No remote named '{remote_name}' is configured"))?;

    git::parse_remote_url(&remote.url).with_context(|| {
        format!(
            "Couldn't parse URL of remote '{remote_name}'. Supported: https and ssh. Found: {}",
            remote.url
        )
    })
}

fn ask_pr_details(session: &mut Session<'_>, current_branch: &str) -> anyhow::Result<PrAnswers> {
    let terminal = &mut session.terminal;
    let title = terminal.ask("Title of the Pull Request: ")?;
    let ticket = terminal.ask("Is this PR associated with any ticket (eg: JIRA-124): ")?;
    let pr_type = terminal.ask("PR type (eg: SHOW, SHIP. ASK): ")?;
    let change_type = terminal.ask(
        "What kind of change is this (eg: Bugfix, Feature, Breaking Change, Doc update): ",
    )?;
    let source_branch =
        terminal.ask(&format!("Source branch name (default: {current_branch}): "))?;
    let target_branch = terminal.ask("Destination branch name: ")?;

    let description = if session.settings.pr_editor {
        io::write_in_editor()?
    } else {
        terminal.say(
            "Explain work done in this PR (When finished hit ctrl-d on a new line to proceed):",
        )?;
        terminal.read_to_end()?
    };

    Ok(PrAnswers {
        title,
        ticket,
        pr_type,
        change_type,
        source_branch: if source_branch.is_empty() {
            current_branch.to_string()
        } else {
            source_branch
        },
        target_branch,
        description,
    })
}

fn report_response(session: &mut Session<'_>, response: &ApiResponse) -> anyhow::Result<()> {
    if response.is_duplicate_pr() {
        return session.terminal.say(
            "\n\nPR already exists for that branch. Please close the PR to create new one.",
        );
    }

    if !response.is_success() {
        anyhow::bail!(
            "GitHub rejected the pull request ({}): {}",
            response.status,
            response.error_message()
        );
    }

    match response.html_url() {
        Some(url) => session.terminal.say(format!("PR created at {url}")),
        None => session.terminal.say("PR created."),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{
        cli::{Settings, forge::github::MockPullRequestApi, run_flow},
        git::{GitRemote, MockGitOps, RemoteDirection},
    };

    const ANSWERS: &str = "Login page\nJIRA-124\nSHIP\nFeature\nfeat/JIRA-124/login\nmain\n\
                           Adds the login page.\nIncludes validation.\n";

    fn settings_with_token_var(var: &str) -> Settings {
        Settings {
            token_env_var: var.to_string(),
            ..Settings::default()
        }
    }

    fn pushed_repo() -> MockGitOps {
        let mut git = MockGitOps::new();

        git.expect_current_branch()
            .returning(|| Ok("feat/JIRA-124/login".to_string()));
        git.expect_remote_branch_exists()
            .withf(|remote, branch| remote == "origin" && branch == "feat/JIRA-124/login")
            .returning(|_, _| Ok(true));
        git.expect_repo_root()
            .returning(|| Ok(PathBuf::from("/home/dev/better-commit")));
        git.expect_remotes().returning(|| {
            Ok(vec![
                GitRemote {
                    name: "origin".to_string(),
                    url: "git@github.com:octo/better-commit.git".to_string(),
                    direction: RemoteDirection::Fetch,
                },
                GitRemote {
                    name: "upstream".to_string(),
                    url: "git@github.com:someone-else/better-commit.git".to_string(),
                    direction: RemoteDirection::Fetch,
                },
            ])
        });

        git
    }

    #[test]
    fn test_answers_to_payload() {
        let answers = PrAnswers {
            title: "Login page".to_string(),
            ticket: "JIRA-124".to_string(),
            pr_type: "SHIP".to_string(),
            change_type: "Feature".to_string(),
            source_branch: "feat/JIRA-124/login".to_string(),
            target_branch: "main".to_string(),
            description: "Adds the login page.\n".to_string(),
        };

        let payload = answers.into_payload();

        assert_eq!(payload.title, "JIRA-124(SHIP): Login page");
        assert!(payload.body.starts_with("# Change Description\n\nAdds the login page.\n\n----"));
        assert!(payload.body.contains("# Type of PR\n\n- [X] SHIP\n"));
        assert!(payload.body.contains("# Type of Change\n\n- [X] Feature\n"));
        assert!(payload.body.ends_with("against linting and validating."));
        assert_eq!(payload.head, "feat/JIRA-124/login");
        assert_eq!(payload.base, "main");
    }

    #[test]
    fn test_create_pr_posts_payload() {
        let git = pushed_repo();
        let mut api = MockPullRequestApi::new();

        api.expect_create_pull_request()
            .withf(|endpoint, payload, token| {
                endpoint.as_str() == "https://api.github.com/repos/octo/better-commit/pulls"
                    && payload.title == "JIRA-124(SHIP): Login page"
                    && payload.body.contains("Adds the login page.\nIncludes validation.")
                    && payload.head == "feat/JIRA-124/login"
                    && payload.base == "main"
                    && token == "t0ken"
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(ApiResponse {
                    status: 201,
                    body: r#"{"html_url": "https://github.com/octo/better-commit/pull/3"}"#
                        .to_string(),
                })
            });

        temp_env::with_var("BC_TEST_PR_TOKEN", Some("t0ken"), || {
            let settings = settings_with_token_var("BC_TEST_PR_TOKEN");
            let (result, output) =
                run_flow(&git, &settings, ANSWERS, |session| create_pr(session, &api));

            assert!(result.is_ok(), "{result:?}");
            assert!(output.contains("hit ctrl-d on a new line"));
            assert!(output.ends_with("PR created at https://github.com/octo/better-commit/pull/3\n"));
        });
    }

    #[test]
    fn test_empty_source_branch_defaults_to_current() {
        let git = pushed_repo();
        let mut api = MockPullRequestApi::new();

        api.expect_create_pull_request()
            .withf(|_, payload, _| payload.head == "feat/JIRA-124/login" && payload.base == "develop")
            .times(1)
            .returning(|_, _, _| {
                Ok(ApiResponse {
                    status: 201,
                    body: "{}".to_string(),
                })
            });

        temp_env::with_var("BC_TEST_PR_DEFAULT_SOURCE", Some("t0ken"), || {
            let settings = settings_with_token_var("BC_TEST_PR_DEFAULT_SOURCE");
            let (result, output) = run_flow(
                &git,
                &settings,
                "Title\nT-1\nASK\nDoc update\n\ndevelop\nDocs.\n",
                |session| create_pr(session, &api),
            );

            assert!(result.is_ok(), "{result:?}");
            assert!(output.ends_with("PR created.\n"));
        });
    }

    #[test]
    fn test_missing_token_never_calls_api() {
        let git = pushed_repo();
        let mut api = MockPullRequestApi::new();

        api.expect_create_pull_request().never();

        temp_env::with_var_unset("BC_TEST_PR_MISSING_TOKEN", || {
            let settings = settings_with_token_var("BC_TEST_PR_MISSING_TOKEN");
            let (result, _) = run_flow(&git, &settings, ANSWERS, |session| create_pr(session, &api));

            assert!(
                result
                    .unwrap_err()
                    .to_string()
                    .starts_with("GitHub token not set")
            );
        });
    }

    #[test]
    fn test_duplicate_pr_notice() {
        let git = pushed_repo();
        let mut api = MockPullRequestApi::new();

        api.expect_create_pull_request()
            .times(1)
            .returning(|_, _, _| {
                Ok(ApiResponse {
                    status: 422,
                    body: r#"{"message":"Validation Failed","errors":[{"message":"A pull request already exists for octo:feat/JIRA-124/login."}]}"#.to_string(),
                })
            });

        temp_env::with_var("BC_TEST_PR_DUPLICATE", Some("t0ken"), || {
            let settings = settings_with_token_var("BC_TEST_PR_DUPLICATE");
            let (result, output) =
                run_flow(&git, &settings, ANSWERS, |session| create_pr(session, &api));

            assert!(result.is_ok());
            assert!(output.ends_with(
                "\n\nPR already exists for that branch. Please close the PR to create new one.\n"
            ));
        });
    }

    #[test]
    fn test_rejected_pr_is_an_error() {
        let git = pushed_repo();
        let mut api = MockPullRequestApi::new();

        api.expect_create_pull_request().returning(|_, _, _| {
            Ok(ApiResponse {
                status: 401,
                body: r#"{"message":"Bad credentials"}"#.to_string(),
            })
        });

        temp_env::with_var("BC_TEST_PR_REJECTED", Some("wrong"), || {
            let settings = settings_with_token_var("BC_TEST_PR_REJECTED");
            let (result, _) = run_flow(&git, &settings, ANSWERS, |session| create_pr(session, &api));

            assert_eq!(
                result.unwrap_err().to_string(),
                "GitHub rejected the pull request (401): Bad credentials"
            );
        });
    }

    #[test]
    fn test_unpushed_branch_refuses_before_prompting() {
        let mut git = MockGitOps::new();
        let mut api = MockPullRequestApi::new();

        git.expect_current_branch()
            .returning(|| Ok("feat/local-only".to_string()));
        git.expect_remote_branch_exists()
            .returning(|_, _| Ok(false));
        git.expect_repo_root().never();
        api.expect_create_pull_request().never();

        let (result, output) = run_flow(&git, &Settings::default(), ANSWERS, |session| {
            create_pr(session, &api)
        });

        assert_eq!(
            result.unwrap_err().to_string(),
            "Branch: feat/local-only has not been pushed to origin. Please push and try again."
        );
        assert!(output.is_empty());
    }

    #[test]
    fn test_unknown_remote_is_an_error() {
        let mut git = pushed_repo();
        let mut api = MockPullRequestApi::new();
        let settings = Settings {
            remote: "fork".to_string(),
            ..Settings::default()
        };

        git.expect_remote_branch_exists()
            .returning(|_, _| Ok(true));
        api.expect_create_pull_request().never();

        let (result, _) = run_flow(&git, &settings, ANSWERS, |session| create_pr(session, &api));

        assert_eq!(
            result.unwrap_err().to_string(),
            "No remote named 'fork' is configured"
        );
    }

    #[test]
    fn test_configured_api_url_is_used() {
        let git = pushed_repo();
        let mut api = MockPullRequestApi::new();
        let settings = Settings {
            api_url: Some("https://git.corp.example/api/v3".to_string()),
            token_env_var: "BC_TEST_PR_API_URL".to_string(),
            ..Settings::default()
        };

        api.expect_create_pull_request()
            .withf(|endpoint, _, _| {
                endpoint.as_str() == "https://git.corp.example/api/v3/repos/octo/better-commit/pulls"
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(ApiResponse {
                    status: 201,
                    body: "{}".to_string(),
                })
            });

        temp_env::with_var("BC_TEST_PR_API_URL", Some("t0ken"), || {
            let (result, _) = run_flow(&git, &settings, ANSWERS, |session| create_pr(session, &api));

            assert!(result.is_ok(), "{result:?}");
        });
    }

    #[test]
    fn test_repository_name() {
        assert_eq!(
            repository_name(Path::new("/home/dev/better-commit")).unwrap(),
            "better-commit"
        );
        assert!(repository_name(Path::new("/")).is_err());
    }
}
