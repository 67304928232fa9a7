//! The promotion dispatcher
//!
//! Classifies the build's branch, picks the handler for its chain edge and
//! drives one promotion step: clone, ensure the destination branch, merge,
//! push and notify. Every invocation performs at most one step; the CI build
//! of the destination branch triggers the next one.

use tracing::{error, info, warn};

use crate::boundary::BoundaryWarning;
use crate::config::{BuildContext, GitConfig};
use crate::domain::{MergeStrategy, Promotion};
use crate::error::Result;
use crate::git::{MergeRequest, PushMode, Repository, REMOTE};
use crate::notify::{Notification, Notifier};

/// Knobs that change how a promotion is carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Ref merged into pre-merge-master when develop is promoted
    pub upstream_ref: String,
    /// Merge commit message for the pre-merge-master reset
    pub reset_merge_message: String,
    /// Merge locally only: no push, no notification
    pub dry_run: bool,
}

impl Settings {
    pub fn from_config(git: &GitConfig, dry_run: bool) -> Self {
        Settings {
            upstream_ref: git.upstream_ref.clone(),
            reset_merge_message: git.reset_merge_message.clone(),
            dry_run,
        }
    }
}

/// Where a newly created destination branch starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartPoint {
    /// `origin/<branch>` when the remote has it, HEAD otherwise
    RemoteTracking,
    /// Always HEAD
    Head,
}

/// What happened during a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionReport {
    pub promotion: Promotion,
    pub pushed: bool,
    pub notified: bool,
    pub warnings: Vec<BoundaryWarning>,
}

/// Result of [Dispatcher::run]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The branch is not part of the chain; nothing was touched
    Skipped { branch: String },
    Promoted(PromotionReport),
}

/// Runs one promotion step for a build
pub struct Dispatcher<R, N> {
    build: BuildContext,
    settings: Settings,
    repo: R,
    notifier: N,
}

impl<R: Repository, N: Notifier> Dispatcher<R, N> {
    pub fn new(build: BuildContext, settings: Settings, repo: R, notifier: N) -> Self {
        Dispatcher {
            build,
            settings,
            repo,
            notifier,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The promotion this build would perform, if any
    pub fn plan(&self) -> Option<Promotion> {
        Promotion::plan(&self.build.branch, &self.settings.upstream_ref)
    }

    /// Perform the promotion step for the build's branch.
    ///
    /// Branches outside the chain are skipped without touching git or the
    /// notifier. Any failing step is reported through the notifier and then
    /// returned.
    pub fn run(&self) -> Result<Outcome> {
        let Some(promotion) = self.plan() else {
            info!(branch = %self.build.branch, "no merge direction for this branch");
            return Ok(Outcome::Skipped {
                branch: self.build.branch.clone(),
            });
        };

        info!(
            category = %promotion.category,
            source = %promotion.source,
            destination = %promotion.destination,
            dry_run = self.settings.dry_run,
            "promoting branch"
        );

        let mut report = PromotionReport {
            promotion: promotion.clone(),
            pushed: false,
            notified: false,
            warnings: Vec::new(),
        };

        let result = match promotion.strategy {
            MergeStrategy::FastForwardOnly => self.fast_forward(&promotion, &mut report),
            MergeStrategy::ResetFromUpstream => self.reset_from_upstream(&promotion, &mut report),
        };

        match result {
            Ok(()) => {
                let notification = Notification::success(&self.build, &promotion.destination);
                self.send(&notification, &mut report);
                Ok(Outcome::Promoted(report))
            }
            Err(err) => {
                error!(destination = %promotion.destination, error = %err, "promotion failed");
                let notification =
                    Notification::failure(&self.build, &promotion.destination, &err);
                self.send(&notification, &mut report);
                Err(err)
            }
        }
    }

    /// Clone the source, fast-forward the destination onto it and push.
    fn fast_forward(&self, promotion: &Promotion, report: &mut PromotionReport) -> Result<()> {
        self.repo.clone_branch(Some(promotion.source.as_str()))?;
        self.check_build_commit(report)?;

        self.ensure_branch(&promotion.destination, StartPoint::RemoteTracking)?;

        info!(reference = %promotion.merge_ref, "fast-forward merge");
        self.repo
            .merge(&MergeRequest::fast_forward(&promotion.merge_ref))?;

        self.push(&promotion.destination, PushMode::Normal, report)
    }

    /// Rebuild the destination from the default branch, merge the upstream
    /// ref into it and force-push, discarding the destination's old state.
    fn reset_from_upstream(
        &self,
        promotion: &Promotion,
        report: &mut PromotionReport,
    ) -> Result<()> {
        self.repo.clone_branch(None)?;

        self.ensure_branch(&promotion.destination, StartPoint::Head)?;

        info!(reference = %promotion.merge_ref, "merge with merge commit");
        self.repo.merge(&MergeRequest::with_message(
            &promotion.merge_ref,
            &self.settings.reset_merge_message,
        ))?;

        self.push(&promotion.destination, PushMode::ForceWithUpstream, report)
    }

    /// Switch to `branch` if it exists locally, create it otherwise
    fn ensure_branch(&self, branch: &str, start: StartPoint) -> Result<()> {
        let local = self.repo.list_local_branches()?;

        if local.iter().any(|name| name == branch) {
            info!(%branch, "checkout existing branch");
            return self.repo.checkout(branch);
        }

        let start_point = match start {
            StartPoint::RemoteTracking if self.repo.remote_branch_exists(branch)? => {
                Some(format!("{}/{}", REMOTE, branch))
            }
            _ => None,
        };

        info!(%branch, start_point = start_point.as_deref().unwrap_or("HEAD"), "create branch");
        self.repo.create_branch(branch, start_point.as_deref())
    }

    fn check_build_commit(&self, report: &mut PromotionReport) -> Result<()> {
        let cloned = self.repo.head_commit()?;
        if !cloned.starts_with(&self.build.commit) {
            warn!(built = %self.build.commit, %cloned, "branch moved since the build started");
            report.warnings.push(BoundaryWarning::CommitMismatch {
                built: self.build.commit.clone(),
                cloned,
            });
        }
        Ok(())
    }

    fn push(&self, branch: &str, mode: PushMode, report: &mut PromotionReport) -> Result<()> {
        if self.settings.dry_run {
            info!(%branch, "dry run, not pushing");
            report.warnings.push(BoundaryWarning::PushSkipped {
                destination: branch.to_string(),
            });
            return Ok(());
        }

        info!(%branch, ?mode, "push");
        self.repo.push(branch, mode)?;
        report.pushed = true;
        Ok(())
    }

    /// Deliver a notification; failures are recorded, never propagated
    fn send(&self, notification: &Notification, report: &mut PromotionReport) {
        if self.settings.dry_run {
            return;
        }

        match self.notifier.notify(notification) {
            Ok(()) => report.notified = true,
            Err(err) => {
                warn!(error = %err, "notification failed");
                report.warnings.push(BoundaryWarning::NotificationFailed {
                    reason: err.to_string(),
                });
            }
        }
    }
}
