use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{PromoteError, Result};

/// Environment variable holding the branch being built
pub const ENV_BRANCH: &str = "TRAVIS_BRANCH";
/// Environment variable holding the commit being built
pub const ENV_COMMIT: &str = "TRAVIS_COMMIT";
/// Environment variable holding the CI build number
pub const ENV_BUILD_NUMBER: &str = "TRAVIS_BUILD_NUMBER";
/// Environment variable holding the `owner/name` repository slug
pub const ENV_REPO_SLUG: &str = "TRAVIS_REPO_SLUG";
/// Environment variable holding the token used to push
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
/// Environment variable holding the Slack bot token
pub const ENV_SLACK_TOKEN: &str = "SLACK_TOKEN";

/// Represents the complete configuration for git-promote.
///
/// Everything here has a default, so a missing config file is fine.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub notification: NotificationConfig,
}

fn default_remote_url() -> String {
    "https://github.com/{repo}".to_string()
}

fn default_committer_name() -> String {
    "Travis CI".to_string()
}

fn default_committer_email() -> String {
    "travis@travis".to_string()
}

fn default_upstream_ref() -> String {
    "origin/develop".to_string()
}

fn default_reset_merge_message() -> String {
    "pre-merge-master from develop and use theirs for test,".to_string()
}

/// Settings for the git command line adapter
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    /// Clone URL template, `{repo}` is replaced by the repository slug
    #[serde(default = "default_remote_url")]
    pub remote_url: String,

    #[serde(default = "default_committer_name")]
    pub committer_name: String,

    #[serde(default = "default_committer_email")]
    pub committer_email: String,

    /// Ref merged into pre-merge-master when develop is promoted
    #[serde(default = "default_upstream_ref")]
    pub upstream_ref: String,

    #[serde(default = "default_reset_merge_message")]
    pub reset_merge_message: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote_url: default_remote_url(),
            committer_name: default_committer_name(),
            committer_email: default_committer_email(),
            upstream_ref: default_upstream_ref(),
            reset_merge_message: default_reset_merge_message(),
        }
    }
}

impl GitConfig {
    /// Clone URL for a repository slug
    pub fn remote_url_for(&self, repo_slug: &str) -> String {
        self.remote_url.replace("{repo}", repo_slug)
    }
}

fn default_channel() -> String {
    "#travis-build-result".to_string()
}

fn default_username() -> String {
    "TravisMergerBot".to_string()
}

fn default_icon_emoji() -> String {
    ":sob:".to_string()
}

fn default_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Settings for the Slack notifier
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NotificationConfig {
    #[serde(default = "default_channel")]
    pub channel: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_icon_emoji")]
    pub icon_emoji: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            channel: default_channel(),
            username: default_username(),
            icon_emoji: default_icon_emoji(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `promote.toml` in current directory
/// 3. `.promote.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        read_config_file(Path::new(path))?
    } else if Path::new("./promote.toml").exists() {
        read_config_file(Path::new("./promote.toml"))?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".promote.toml");
        if config_path.exists() {
            read_config_file(&config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str)
        .map_err(|e| PromoteError::config(format!("Invalid config file: {}", e)))
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        PromoteError::config(format!("Cannot read config file {}: {}", path.display(), e))
    })
}

/// Everything the CI system tells us about the current build.
///
/// All fields are required; the tokens never show up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct BuildEnvironment {
    pub branch: String,
    pub commit: String,
    pub build_number: String,
    pub repo_slug: String,
    pub github_token: String,
    pub slack_token: String,
}

impl BuildEnvironment {
    /// Read the build environment from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the build environment through an arbitrary lookup function.
    ///
    /// A variable that is unset or empty is a configuration error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(PromoteError::config(format!(
                    "missing required environment variable {}",
                    key
                ))),
            }
        };

        Ok(BuildEnvironment {
            branch: require(ENV_BRANCH)?,
            commit: require(ENV_COMMIT)?,
            build_number: require(ENV_BUILD_NUMBER)?,
            repo_slug: require(ENV_REPO_SLUG)?,
            github_token: require(ENV_GITHUB_TOKEN)?,
            slack_token: require(ENV_SLACK_TOKEN)?,
        })
    }
}

impl BuildEnvironment {
    /// The non-secret part of the environment
    pub fn context(&self) -> BuildContext {
        BuildContext {
            branch: self.branch.clone(),
            commit: self.commit.clone(),
            build_number: self.build_number.clone(),
            repo_slug: self.repo_slug.clone(),
        }
    }
}

/// Identifies the build a promotion runs for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub branch: String,
    pub commit: String,
    pub build_number: String,
    pub repo_slug: String,
}

impl fmt::Debug for BuildEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildEnvironment")
            .field("branch", &self.branch)
            .field("commit", &self.commit)
            .field("build_number", &self.build_number)
            .field("repo_slug", &self.repo_slug)
            .field("github_token", &"<redacted>")
            .field("slack_token", &"<redacted>")
            .finish()
    }
}
