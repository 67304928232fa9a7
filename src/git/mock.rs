use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::error::{GitStep, PromoteError, Result};
use crate::git::{MergeRequest, PushMode, Repository};

/// A recorded call against [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Clone {
        branch: Option<String>,
    },
    Checkout {
        branch: String,
    },
    CreateBranch {
        branch: String,
        start_point: Option<String>,
    },
    Merge(MergeRequest),
    Push {
        branch: String,
        mode: PushMode,
    },
}

impl GitCall {
    /// Whether the call changes repository state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, GitCall::Clone { .. })
    }
}

/// Mock repository for testing without actual git operations.
///
/// Cloning populates the local branch list with the cloned branch, creating
/// a branch adds to it. Any step can be made to fail with canned git output.
pub struct MockRepository {
    default_branch: String,
    head_commit: String,
    remote_branches: HashSet<String>,
    failures: HashMap<GitStep, String>,
    local_branches: Mutex<Vec<String>>,
    calls: Mutex<Vec<GitCall>>,
}

impl MockRepository {
    /// Create a new mock whose remote only has `master`
    pub fn new() -> Self {
        MockRepository {
            default_branch: "master".to_string(),
            head_commit: "0000000000000000000000000000000000000000".to_string(),
            remote_branches: HashSet::from(["master".to_string()]),
            failures: HashMap::new(),
            local_branches: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a branch to the simulated remote
    pub fn add_remote_branch(&mut self, branch: impl Into<String>) {
        self.remote_branches.insert(branch.into());
    }

    /// Set the commit id reported for HEAD after cloning
    pub fn set_head_commit(&mut self, commit: impl Into<String>) {
        self.head_commit = commit.into();
    }

    /// Make `step` fail with the given git output
    pub fn fail_on(&mut self, step: GitStep, output: impl Into<String>) {
        self.failures.insert(step, output.into());
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<GitCall> {
        lock(&self.calls).clone()
    }

    /// Calls that would have changed a real repository
    pub fn mutations(&self) -> Vec<GitCall> {
        self.calls().into_iter().filter(GitCall::is_mutation).collect()
    }

    fn record(&self, call: GitCall) {
        lock(&self.calls).push(call);
    }

    fn check(&self, step: GitStep) -> Result<()> {
        match self.failures.get(&step) {
            Some(output) => Err(PromoteError::command(step, output.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Repository for MockRepository {
    fn clone_branch(&self, branch: Option<&str>) -> Result<()> {
        self.record(GitCall::Clone {
            branch: branch.map(str::to_string),
        });
        self.check(GitStep::Clone)?;

        let checked_out = branch.unwrap_or(self.default_branch.as_str()).to_string();
        if !self.remote_branches.contains(&checked_out) {
            return Err(PromoteError::command(
                GitStep::Clone,
                format!(
                    "warning: Could not find remote branch {} to clone.\nfatal: Remote branch {} not found in upstream origin",
                    checked_out, checked_out
                ),
            ));
        }

        *lock(&self.local_branches) = vec![checked_out];
        Ok(())
    }

    fn head_commit(&self) -> Result<String> {
        Ok(self.head_commit.clone())
    }

    fn list_local_branches(&self) -> Result<Vec<String>> {
        self.check(GitStep::ListBranches)?;
        Ok(lock(&self.local_branches).clone())
    }

    fn remote_branch_exists(&self, branch: &str) -> Result<bool> {
        Ok(self.remote_branches.contains(branch))
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.record(GitCall::Checkout {
            branch: branch.to_string(),
        });
        self.check(GitStep::Checkout)
    }

    fn create_branch(&self, branch: &str, start_point: Option<&str>) -> Result<()> {
        self.record(GitCall::CreateBranch {
            branch: branch.to_string(),
            start_point: start_point.map(str::to_string),
        });
        self.check(GitStep::CreateBranch)?;

        lock(&self.local_branches).push(branch.to_string());
        Ok(())
    }

    fn merge(&self, request: &MergeRequest) -> Result<()> {
        self.record(GitCall::Merge(request.clone()));
        self.check(GitStep::Merge)
    }

    fn push(&self, branch: &str, mode: PushMode) -> Result<()> {
        self.record(GitCall::Push {
            branch: branch.to_string(),
            mode,
        });
        self.check(GitStep::Push)
    }
}
