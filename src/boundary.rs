use std::fmt;

/// Non-fatal conditions met while promoting a branch.
/// These should be reported to the user but never fail the run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The branch is not part of the promotion chain
    UnknownBranch { branch: String },
    /// The cloned branch head is not the commit that was built
    CommitMismatch { built: String, cloned: String },
    /// Dry run: the destination was merged locally but not pushed
    PushSkipped { destination: String },
    /// The notification could not be delivered
    NotificationFailed { reason: String },
}

/// First seven characters; the build commit comes from the environment
/// and is not guaranteed to be hex
fn short_hash(hash: &str) -> &str {
    hash.char_indices()
        .nth(7)
        .map_or(hash, |(end, _)| &hash[..end])
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::UnknownBranch { branch } => {
                write!(f, "No merge direction for branch '{}'", branch)
            }
            BoundaryWarning::CommitMismatch { built, cloned } => {
                write!(
                    f,
                    "Branch moved since the build started (built: {}, cloned: {})",
                    short_hash(built),
                    short_hash(cloned)
                )
            }
            BoundaryWarning::PushSkipped { destination } => {
                write!(f, "Dry run: not pushing '{}'", destination)
            }
            BoundaryWarning::NotificationFailed { reason } => {
                write!(f, "Could not send notification: {}", reason)
            }
        }
    }
}
