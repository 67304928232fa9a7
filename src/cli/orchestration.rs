//! Main workflow orchestration logic
//!
//! Wires configuration, the build environment, the git adapter and the
//! notifier into a [Dispatcher] and runs it. Kept apart from `main.rs` so
//! the workflow can be driven without clap.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;
use tracing::info;

use crate::config::{BuildEnvironment, Config};
use crate::dispatch::{Dispatcher, Outcome, Settings};
use crate::domain::Promotion;
use crate::error::PromoteError;
use crate::git::{CliRepository, Identity};
use crate::notify::SlackNotifier;
use crate::ui;

/// Arguments for the promote workflow
///
/// Mirrors the CLI Args in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PromoteWorkflowArgs {
    /// Promote this branch instead of the one in the build environment
    pub branch: Option<String>,

    /// Clone here instead of a fresh temporary directory
    pub work_dir: Option<PathBuf>,

    /// Merge locally only
    pub dry_run: bool,
}

/// Directory the clone lives in for the duration of one run
#[derive(Debug)]
pub enum WorkDir {
    /// Removed when dropped
    Temporary(TempDir),
    Given(PathBuf),
}

impl WorkDir {
    /// Use `dir` when given, otherwise create a temporary directory.
    ///
    /// A given directory is created if missing and must be empty, since the
    /// clone goes straight into it.
    pub fn prepare(dir: Option<&Path>) -> crate::Result<Self> {
        match dir {
            Some(path) => {
                fs::create_dir_all(path)?;
                if fs::read_dir(path)?.next().is_some() {
                    return Err(PromoteError::config(format!(
                        "working directory {} is not empty",
                        path.display()
                    )));
                }
                Ok(WorkDir::Given(path.to_path_buf()))
            }
            None => {
                let temp = tempfile::Builder::new().prefix("git-promote-").tempdir()?;
                Ok(WorkDir::Temporary(temp))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            WorkDir::Temporary(temp) => temp.path(),
            WorkDir::Given(path) => path,
        }
    }
}

/// Main promote workflow
///
/// 1. Resolve the branch and plan the promotion
/// 2. Stop early for branches outside the chain
/// 3. Prepare the working directory
/// 4. Run the dispatcher against git and Slack
pub fn run_promote_workflow(
    args: &PromoteWorkflowArgs,
    config: &Config,
    mut env: BuildEnvironment,
) -> Result<Outcome> {
    if let Some(branch) = &args.branch {
        env.branch = branch.clone();
    }

    info!(
        branch = %env.branch,
        build = %env.build_number,
        repo = %env.repo_slug,
        "starting merger"
    );

    match Promotion::plan(&env.branch, &config.git.upstream_ref) {
        Some(promotion) => ui::display_plan(&promotion, args.dry_run),
        None => {
            info!(branch = %env.branch, "no merge direction for this branch");
            return Ok(Outcome::Skipped { branch: env.branch });
        }
    }

    let work_dir = WorkDir::prepare(args.work_dir.as_deref())
        .context("Failed to prepare working directory")?;
    info!(dir = %work_dir.path().display(), "using working directory");

    let identity = Identity::new(
        config.git.committer_name.clone(),
        config.git.committer_email.clone(),
    );
    let repo = CliRepository::new(
        work_dir.path(),
        config.git.remote_url_for(&env.repo_slug),
        identity,
    )
    .with_token(env.github_token.clone());
    let notifier = SlackNotifier::new(env.slack_token.clone(), config.notification.clone());

    let dispatcher = Dispatcher::new(
        env.context(),
        Settings::from_config(&config.git, args.dry_run),
        repo,
        notifier,
    );

    let outcome = dispatcher
        .run()
        .with_context(|| format!("Promotion of '{}' failed", env.branch))?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_temporary_dir_is_removed_on_drop() {
        let work = WorkDir::prepare(None).unwrap();
        let path = work.path().to_path_buf();
        assert!(path.is_dir());
        drop(work);
        assert!(!path.exists());
    }

    #[test]
    fn test_prepare_given_dir_is_created() {
        let parent = TempDir::new().unwrap();
        let target = parent.path().join("clone");
        let work = WorkDir::prepare(Some(&target)).unwrap();
        assert_eq!(work.path(), target.as_path());
        assert!(target.is_dir());
    }

    #[test]
    fn test_prepare_rejects_non_empty_dir() {
        let parent = TempDir::new().unwrap();
        fs::write(parent.path().join("leftover"), "x").unwrap();

        let err = WorkDir::prepare(Some(parent.path())).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
