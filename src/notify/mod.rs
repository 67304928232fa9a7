//! Build result notifications
//!
//! Notifications are a best-effort side channel: the dispatcher logs a
//! failed delivery and carries on.

pub mod slack;

pub use slack::SlackNotifier;

use crate::config::BuildContext;
use crate::error::{PromoteError, Result};

/// Outcome reported by a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Succeeded,
    Failed,
}

/// A message about one promotion step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub status: Status,
    pub text: String,
}

impl Notification {
    /// Promotion of the build's branch into `destination` finished
    pub fn success(build: &BuildContext, destination: &str) -> Self {
        Notification {
            status: Status::Succeeded,
            text: format!(
                "merging BUILD{} from {} `{}` to `{}` done",
                build.build_number, build.repo_slug, build.branch, destination
            ),
        }
    }

    /// Promotion of the build's branch into `destination` failed with `error`
    pub fn failure(build: &BuildContext, destination: &str, error: &PromoteError) -> Self {
        Notification {
            status: Status::Failed,
            text: format!(
                "error found during merging BUILD{} `{}` from `{}` to `{}`: {}",
                build.build_number,
                build.repo_slug,
                build.branch,
                destination,
                failure_reason(error)
            ),
        }
    }
}

/// One line summary of an error, without captured command output
fn failure_reason(error: &PromoteError) -> String {
    match error {
        PromoteError::Command { step, kind, .. } => format!("{} failed ({})", step, kind),
        other => other.to_string(),
    }
}

/// Something that can deliver a [Notification]
pub trait Notifier {
    fn notify(&self, notification: &Notification) -> Result<()>;
}
