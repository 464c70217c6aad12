use reqwest::{IntoUrl, blocking::RequestBuilder};

const USER_AGENT: &str = concat!("better-commit/", env!("CARGO_PKG_VERSION"));

pub struct HttpClient {
    reqwest_client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            reqwest_client: reqwest::blocking::Client::new(),
        }
    }

    pub fn post(&self, url: impl IntoUrl) -> RequestBuilder {
        self.reqwest_client
            .post(url)
            .header("User-Agent", USER_AGENT)
    }
}

pub trait WithAuth {
    fn with_auth(self, token: &str, auth_scheme: &str) -> RequestBuilder;
}

impl WithAuth for RequestBuilder {
    fn with_auth(self, token: &str, auth_scheme: &str) -> RequestBuilder {
        self.header("Authorization", format!("{auth_scheme} {token}"))
    }
}

/// Reads an API token from the environment.
///
/// # Errors
///
/// Returns an error if the variable is unset, empty or not valid unicode.
pub fn read_token(env_var: &str) -> anyhow::Result<String> {
    match std::env::var(env_var) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Ok(_) => anyhow::bail!("GitHub token not set: {env_var} is empty"),
        Err(e) => anyhow::bail!(
            "GitHub token not set: there is a problem with the {env_var} environment variable: {e}"
        ),
    }
}
