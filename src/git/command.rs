use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use git2::{BranchType, ErrorCode, Repository as Git2Repo};
use regex::Regex;
use tracing::debug;

use crate::error::{GitStep, PromoteError, Result};
use crate::git::{MergeMode, MergeRequest, PushMode, Repository, REMOTE};

/// Name and email used for every commit git creates on our behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Identity {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// [Repository] backed by the `git` command line.
///
/// Mutating operations shell out to `git` inside the working directory.
/// Read-only inspection (branch lists, HEAD) goes through `git2`.
pub struct CliRepository {
    work_dir: PathBuf,
    remote_url: String,
    token: Option<String>,
    identity: Identity,
}

impl CliRepository {
    /// Create a repository handle for `work_dir`, cloned from `remote_url`
    pub fn new(
        work_dir: impl Into<PathBuf>,
        remote_url: impl Into<String>,
        identity: Identity,
    ) -> Self {
        CliRepository {
            work_dir: work_dir.into(),
            remote_url: remote_url.into(),
            token: None,
            identity,
        }
    }

    /// Authenticate HTTPS remotes with `token`.
    ///
    /// The token travels in an `http.extraHeader` passed through the
    /// environment, never in the URL or on the command line.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn open(&self) -> Result<Git2Repo> {
        Ok(Git2Repo::open(&self.work_dir)?)
    }

    fn local_branch_names(&self) -> std::result::Result<Vec<String>, git2::Error> {
        let repo = Git2Repo::open(&self.work_dir)?;
        let mut names = Vec::new();

        for entry in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    fn git(&self, step: GitStep, args: &[&str]) -> Result<String> {
        debug!(%step, ?args, dir = %self.work_dir.display(), "running git");

        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.work_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_COMMITTER_NAME", &self.identity.name)
            .env("GIT_COMMITTER_EMAIL", &self.identity.email)
            .env("GIT_AUTHOR_NAME", &self.identity.name)
            .env("GIT_AUTHOR_EMAIL", &self.identity.email);

        if let Some(token) = &self.token {
            cmd.env("GIT_CONFIG_COUNT", "1")
                .env("GIT_CONFIG_KEY_0", "http.extraHeader")
                .env("GIT_CONFIG_VALUE_0", auth_header(token));
        }

        let output = cmd.output()?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let detail = [stderr.trim(), stdout.trim()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(PromoteError::command(step, redact_credentials(&detail)));
        }

        debug!(%step, output = %redact_credentials(stdout.trim()), "git finished");
        Ok(stdout)
    }
}

/// `Authorization` header value GitHub accepts for token pushes over HTTPS
pub fn auth_header(token: &str) -> String {
    let credentials = STANDARD.encode(format!("x-access-token:{}", token));
    format!("Authorization: Basic {}", credentials)
}

fn credentials_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?P<scheme>[a-zA-Z][a-zA-Z0-9+.-]*://)[^/@\s]+@")
            .expect("credentials pattern is valid")
    })
}

/// Replace `user:token@` parts of URLs in `text` with `***@`
pub fn redact_credentials(text: &str) -> String {
    credentials_pattern()
        .replace_all(text, "${scheme}***@")
        .into_owned()
}

impl Repository for CliRepository {
    fn clone_branch(&self, branch: Option<&str>) -> Result<()> {
        let mut args = vec!["clone", "--no-tags"];
        if let Some(branch) = branch {
            args.extend(["--branch", branch]);
        }
        args.extend([self.remote_url.as_str(), "."]);

        self.git(GitStep::Clone, &args)?;
        Ok(())
    }

    fn head_commit(&self) -> Result<String> {
        let repo = self.open()?;
        let commit = repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    fn list_local_branches(&self) -> Result<Vec<String>> {
        self.local_branch_names()
            .map_err(|e| PromoteError::command(GitStep::ListBranches, e.message()))
    }

    fn remote_branch_exists(&self, branch: &str) -> Result<bool> {
        let repo = self.open()?;
        let tracking = format!("{}/{}", REMOTE, branch);

        let exists = match repo.find_branch(&tracking, BranchType::Remote) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        };
        exists
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.git(GitStep::Checkout, &["checkout", branch])?;
        Ok(())
    }

    fn create_branch(&self, branch: &str, start_point: Option<&str>) -> Result<()> {
        let mut args = vec!["checkout", "-b", branch];
        if let Some(start) = start_point {
            args.push(start);
        }

        self.git(GitStep::CreateBranch, &args)?;
        Ok(())
    }

    fn merge(&self, request: &MergeRequest) -> Result<()> {
        let args = match &request.mode {
            MergeMode::FastForwardOnly => vec!["merge", "--ff-only", request.reference.as_str()],
            MergeMode::WithMessage(message) => {
                vec!["merge", "-m", message.as_str(), request.reference.as_str()]
            }
        };

        self.git(GitStep::Merge, &args)?;
        Ok(())
    }

    fn push(&self, branch: &str, mode: PushMode) -> Result<()> {
        let args = match mode {
            PushMode::Normal => vec!["push", REMOTE, branch],
            PushMode::ForceWithUpstream => vec!["push", "--force", "--set-upstream", REMOTE, branch],
        };

        self.git(GitStep::Push, &args)?;
        Ok(())
    }
}
