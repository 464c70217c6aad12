//! User configuration.
//!
//! The file lives in the platform config directory (e.g.
//! `~/.config/better-commit/config.toml`) and is only ever read. A missing
//! file means defaults.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

const APP_NAME: &str = "better-commit";
const CONFIG_NAME: &str = "config";

const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_TOKEN_ENV_VAR: &str = "GH_TOKEN";
const DEFAULT_MIN_COMMIT_MESSAGE_LENGTH: usize = 20;

/// Settings resolved once at startup and handed to every command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Branches that must not be committed or pushed to directly.
    pub protected_branches: Vec<String>,

    /// Commit descriptions this long or shorter get a warning.
    pub min_commit_message_length: usize,

    /// Measure the description without surrounding whitespace. When off, the
    /// trailing newline of the typed answer counts towards the length.
    pub trim_before_length_check: bool,

    /// Git remote used by `push`, `open` and `pr`.
    pub remote: String,

    /// Environment variable holding the API token for `pr`.
    pub token_env_var: String,

    /// Base URL of the REST API. Derived from the remote's host when unset.
    pub api_url: Option<String>,

    /// Write the pull request description in `$EDITOR` instead of on stdin.
    pub pr_editor: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            protected_branches: vec!["main".to_string(), "master".to_string()],
            min_commit_message_length: DEFAULT_MIN_COMMIT_MESSAGE_LENGTH,
            trim_before_length_check: false,
            remote: DEFAULT_REMOTE.to_string(),
            token_env_var: DEFAULT_TOKEN_ENV_VAR.to_string(),
            api_url: None,
            pr_editor: false,
        }
    }
}

impl Settings {
    /// Loads the settings file if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory can't be determined or the
    /// file exists but can't be parsed.
    pub fn load_from_disk() -> anyhow::Result<Settings> {
        let path = confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
            .context("Failed to determine the configuration file path")?;

        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");

            return Ok(Settings::default());
        }

        let settings: Settings = confy::load_path(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

        Ok(settings.validated())
    }

    /// Replaces unusable values with their defaults.
    pub fn validated(mut self) -> Settings {
        let defaults = Settings::default();

        if self.remote.trim().is_empty() {
            warn!("Invalid value for 'remote': must not be empty, using '{DEFAULT_REMOTE}'");
            self.remote = defaults.remote;
        }

        if self.token_env_var.trim().is_empty() {
            warn!(
                "Invalid value for 'token-env-var': must not be empty, using '{DEFAULT_TOKEN_ENV_VAR}'"
            );
            self.token_env_var = defaults.token_env_var;
        }

        if let Some(Err(e)) = self.api_url.as_deref().map(Url::parse) {
            warn!(
                "Invalid value for 'api-url': '{}' ({e}), deriving it from the remote",
                self.api_url.as_deref().unwrap_or_default()
            );
            self.api_url = None;
        }

        self
    }

    pub fn is_protected(&self, branch: &str) -> bool {
        self.protected_branches.iter().any(|b| b == branch)
    }

    /// Protected branch names for messages, e.g. "main or master".
    pub fn protected_branches_display(&self) -> String {
        self.protected_branches.join(" or ")
    }

    /// Whether a commit description deserves the "too short" warning.
    pub fn is_commit_message_too_short(&self, description: &str) -> bool {
        let description = if self.trim_before_length_check {
            description.trim()
        } else {
            description
        };

        description.chars().count() <= self.min_commit_message_length
    }
}
