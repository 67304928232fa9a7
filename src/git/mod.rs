//! Git operations abstraction layer
//!
//! The promotion handlers only need a handful of operations on a fresh
//! working copy: clone, list local branches, switch or create a branch,
//! merge and push. They are expressed by the [Repository] trait so the
//! dispatcher can be driven by:
//!
//! - [command::CliRepository]: runs the `git` command line inside a working
//!   directory and inspects the result with `git2`
//! - [mock::MockRepository]: records calls in memory for testing
//!
//! ```rust
//! # use git_promote::git::{MergeRequest, PushMode, Repository};
//! # fn example<R: Repository>(repo: &R) -> git_promote::Result<()> {
//! repo.clone_branch(Some("fix/crash-on-null"))?;
//! repo.create_branch("pre-merge/crash-on-null", None)?;
//! repo.merge(&MergeRequest::fast_forward("fix/crash-on-null"))?;
//! repo.push("pre-merge/crash-on-null", PushMode::Normal)?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod mock;

pub use command::{CliRepository, Identity};
pub use mock::{GitCall, MockRepository};

use crate::error::Result;

/// Name of the remote every clone gets
pub const REMOTE: &str = "origin";

/// How a merge is allowed to proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeMode {
    /// `git merge --ff-only`; refuses diverged history
    FastForwardOnly,
    /// `git merge -m <message>`; creates a merge commit when needed
    WithMessage(String),
}

/// A merge of `reference` into the current branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub reference: String,
    pub mode: MergeMode,
}

impl MergeRequest {
    /// Fast-forward-only merge of `reference`
    pub fn fast_forward(reference: impl Into<String>) -> Self {
        MergeRequest {
            reference: reference.into(),
            mode: MergeMode::FastForwardOnly,
        }
    }

    /// Merge of `reference` with an explicit merge commit message
    pub fn with_message(reference: impl Into<String>, message: impl Into<String>) -> Self {
        MergeRequest {
            reference: reference.into(),
            mode: MergeMode::WithMessage(message.into()),
        }
    }
}

/// How a branch is pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    /// Plain push, rejected by the remote unless it fast-forwards
    Normal,
    /// `--force --set-upstream`, overwriting the remote branch
    ForceWithUpstream,
}

/// Git operations needed by the promotion handlers.
///
/// All operations act on a single working copy owned by the implementor.
/// Every failure is reported as an error; nothing is silently ignored.
pub trait Repository: Send + Sync {
    /// Clone the remote into the working copy.
    ///
    /// With `Some(branch)` the clone checks out that branch, with `None` the
    /// remote's default branch.
    fn clone_branch(&self, branch: Option<&str>) -> Result<()>;

    /// Full commit id of the checked-out HEAD
    fn head_commit(&self) -> Result<String>;

    /// Names of the local branches
    fn list_local_branches(&self) -> Result<Vec<String>>;

    /// Whether `origin/<branch>` exists as a remote-tracking branch
    fn remote_branch_exists(&self, branch: &str) -> Result<bool>;

    /// Switch to an existing local branch
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Create a branch and switch to it.
    ///
    /// The branch starts at `start_point` when given, at HEAD otherwise.
    fn create_branch(&self, branch: &str, start_point: Option<&str>) -> Result<()>;

    /// Merge into the current branch
    fn merge(&self, request: &MergeRequest) -> Result<()>;

    /// Push a local branch to the remote
    fn push(&self, branch: &str, mode: PushMode) -> Result<()>;
}
