use anyhow::Context;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{
    cli::forge::http_client::{HttpClient, WithAuth},
    git::GitRemoteData,
};

const AUTH_SCHEME: &str = "Bearer";
const API_VERSION: &str = "2022-11-28";

/// Substring GitHub puts in the error body when the head branch already has
/// an open pull request.
pub const DUPLICATE_PR_MARKER: &str = "A pull request already exists for";

// =============================================================================
// Domain Types
// =============================================================================

/// Request body of `POST /repos/{owner}/{repo}/pulls`.
/// https://docs.github.com/en/rest/pulls/pulls#create-a-pull-request
#[derive(Debug, PartialEq, Serialize)]
pub struct PullRequestPayload {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

/// Status and raw body of an API response.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_duplicate_pr(&self) -> bool {
        self.body.contains(DUPLICATE_PR_MARKER)
    }

    /// Web URL of a freshly created pull request.
    pub fn html_url(&self) -> Option<String> {
        serde_json::from_str::<GitHubPullRequest>(&self.body)
            .ok()
            .map(|pr| pr.html_url)
    }

    /// The `message` GitHub attaches to errors, or the raw body.
    pub fn error_message(&self) -> String {
        serde_json::from_str::<GitHubError>(&self.body)
            .map(|e| e.message)
            .unwrap_or_else(|_| self.body.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct GitHubPullRequest {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct GitHubError {
    message: String,
}

// =============================================================================
// Client
// =============================================================================

#[cfg_attr(test, automock)]
pub trait PullRequestApi {
    /// Sends the create request. Non-success statuses are not errors here;
    /// the caller inspects the response.
    fn create_pull_request(
        &self,
        endpoint: &Url,
        payload: &PullRequestPayload,
        token: &str,
    ) -> anyhow::Result<ApiResponse>;
}

pub struct GitHubClient {
    http_client: HttpClient,
}

impl GitHubClient {
    pub fn new() -> Self {
        Self {
            http_client: HttpClient::new(),
        }
    }
}

impl PullRequestApi for GitHubClient {
    fn create_pull_request(
        &self,
        endpoint: &Url,
        payload: &PullRequestPayload,
        token: &str,
    ) -> anyhow::Result<ApiResponse> {
        debug!(%endpoint, head = %payload.head, base = %payload.base, "creating pull request");

        let response = self
            .http_client
            .post(endpoint.clone())
            .with_auth(token, AUTH_SCHEME)
            .header("Content-Type", "application/json")
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(payload)
            .send()
            .context("Failed to create pull request on GitHub")?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .context("Failed to read GitHub API response")?;

        debug!(status, "GitHub responded");

        Ok(ApiResponse { status, body })
    }
}

// =============================================================================
// URLs
// =============================================================================

/// Base URL of the REST API serving `remote`.
pub fn api_base_url(remote: &GitRemoteData) -> String {
    let (host, port) = (&remote.host, remote.port);

    if host == "github.com" {
        "https://api.github.com".to_string()
    } else {
        match port {
            Some(p) => format!("https://{host}:{p}/api/v3"),
            None => format!("https://{host}/api/v3"),
        }
    }
}

/// `<api_base>/repos/<owner>/<repo>/pulls`
///
/// # Errors
///
/// Returns an error if `api_base` isn't an absolute URL with a path.
pub fn pulls_endpoint(api_base: &str, owner: &str, repo: &str) -> anyhow::Result<Url> {
    let mut url =
        Url::parse(api_base).with_context(|| format!("Invalid API base URL: {api_base}"))?;

    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("API base URL can't have a path: {api_base}"))?
        .pop_if_empty()
        .extend(["repos", owner, repo, "pulls"]);

    Ok(url)
}
