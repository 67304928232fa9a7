//! Shared fixtures for integration tests
//!
//! Not every test file uses every helper.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use git_promote::config::BuildContext;
use git_promote::notify::{Notification, Notifier, Status};
use git_promote::{PromoteError, Result};
use tempfile::TempDir;

/// Notifier that keeps every notification in memory
#[derive(Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    /// A notifier whose deliveries always fail
    pub fn failing() -> Self {
        RecordingNotifier {
            sent: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.borrow().clone()
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.sent.borrow().iter().map(|n| n.status).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        self.sent.borrow_mut().push(notification.clone());
        if self.fail {
            Err(PromoteError::notify("channel_not_found"))
        } else {
            Ok(())
        }
    }
}

pub fn build(branch: &str, commit: &str) -> BuildContext {
    BuildContext {
        branch: branch.to_string(),
        commit: commit.to_string(),
        build_number: "42".to_string(),
        repo_slug: "octo/widgets".to_string(),
    }
}

/// Run git in `dir` with a fixed identity, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "commit.gpgsign=false"])
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test User")
        .env("GIT_AUTHOR_EMAIL", "test@test.com")
        .env("GIT_COMMITTER_NAME", "Test User")
        .env("GIT_COMMITTER_EMAIL", "test@test.com")
        .output()
        .expect("git must be installed");

    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A bare "origin" repository plus a seed clone used to shape its history
pub struct RemoteFixture {
    _root: TempDir,
    pub bare: PathBuf,
    seed: PathBuf,
}

impl RemoteFixture {
    /// A remote whose default branch `master` has one commit
    pub fn new() -> Self {
        let root = TempDir::new().expect("create fixture dir");
        let bare = root.path().join("remote.git");
        let seed = root.path().join("seed");

        git(root.path(), &["init", "--bare", "remote.git"]);
        git(&bare, &["symbolic-ref", "HEAD", "refs/heads/master"]);
        git(
            root.path(),
            &["clone", &bare.to_string_lossy(), &seed.to_string_lossy()],
        );
        git(&seed, &["symbolic-ref", "HEAD", "refs/heads/master"]);

        // master is unborn until the first commit, so it cannot be checked out yet
        fs::write(seed.join("README.md"), "hello\n").expect("write fixture file");
        git(&seed, &["add", "README.md"]);
        git(&seed, &["commit", "-m", "initial commit"]);
        git(&seed, &["push", "origin", "master"]);

        RemoteFixture {
            _root: root,
            bare,
            seed,
        }
    }

    /// Remote URL to clone from
    pub fn url(&self) -> String {
        self.bare.to_string_lossy().into_owned()
    }

    /// Create `branch` at the tip of `base` and push it
    pub fn branch_from(&self, branch: &str, base: &str) {
        git(&self.seed, &["checkout", base]);
        git(&self.seed, &["checkout", "-b", branch]);
        git(&self.seed, &["push", "origin", branch]);
    }

    /// Commit a file on `branch`, push, and return the new commit id
    pub fn commit(&self, branch: &str, file: &str, content: &str) -> String {
        git(&self.seed, &["checkout", branch]);
        fs::write(self.seed.join(file), content).expect("write fixture file");
        git(&self.seed, &["add", file]);
        git(&self.seed, &["commit", "-m", &format!("update {}", file)]);
        git(&self.seed, &["push", "origin", branch]);
        git(&self.seed, &["rev-parse", "HEAD"])
    }

    /// Commit id of `branch` on the remote, `None` if it does not exist
    pub fn head(&self, branch: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("refs/heads/{}", branch))
            .current_dir(&self.bare)
            .output()
            .expect("git must be installed");

        if output.status.success() {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            None
        }
    }

    /// Whether `ancestor` is reachable from `descendant` on the remote
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        Command::new("git")
            .args(["merge-base", "--is-ancestor", ancestor, descendant])
            .current_dir(&self.bare)
            .status()
            .expect("git must be installed")
            .success()
    }
}
