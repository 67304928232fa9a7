use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// The git step that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitStep {
    Clone,
    ListBranches,
    Checkout,
    CreateBranch,
    Merge,
    Push,
}

impl fmt::Display for GitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GitStep::Clone => "clone",
            GitStep::ListBranches => "branch listing",
            GitStep::Checkout => "checkout",
            GitStep::CreateBranch => "branch creation",
            GitStep::Merge => "merge",
            GitStep::Push => "push",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a failed git command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TransientNetwork,
    AuthFailure,
    Conflict,
    Unknown,
}

fn conflict_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)not possible to fast-forward|CONFLICT \(|automatic merge failed|non-fast-forward|\[rejected\]|fetch first|diverging branches",
        )
        .expect("conflict pattern is valid")
    })
}

fn auth_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)authentication failed|permission denied|could not read (username|password)|terminal prompts disabled|invalid username or password|returned error: 40[13]",
        )
        .expect("auth pattern is valid")
    })
}

fn network_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)could not resolve host|connection (timed out|refused|reset)|operation timed out|network is unreachable|early eof|remote end hung up|rpc failed|temporary failure|returned error: 5\d\d",
        )
        .expect("network pattern is valid")
    })
}

impl FailureKind {
    /// Classify captured git output.
    ///
    /// Conflicts are checked first since a rejected push also mentions the
    /// remote, then authentication, then network trouble.
    pub fn classify(output: &str) -> Self {
        if conflict_pattern().is_match(output) {
            FailureKind::Conflict
        } else if auth_pattern().is_match(output) {
            FailureKind::AuthFailure
        } else if network_pattern().is_match(output) {
            FailureKind::TransientNetwork
        } else {
            FailureKind::Unknown
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::TransientNetwork => "transient network failure",
            FailureKind::AuthFailure => "authentication failure",
            FailureKind::Conflict => "conflict",
            FailureKind::Unknown => "unknown failure",
        };
        f.write_str(name)
    }
}

/// Unified error type for git-promote operations
#[derive(Error, Debug)]
pub enum PromoteError {
    #[error("Git {step} failed ({kind}): {detail}")]
    Command {
        step: GitStep,
        kind: FailureKind,
        detail: String,
    },

    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-promote
pub type Result<T> = std::result::Result<T, PromoteError>;

impl PromoteError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        PromoteError::Config(msg.into())
    }

    /// Create a notification error with context
    pub fn notify(msg: impl Into<String>) -> Self {
        PromoteError::Notify(msg.into())
    }

    /// Create a command error, classifying the captured output
    pub fn command(step: GitStep, output: impl Into<String>) -> Self {
        let detail = output.into();
        PromoteError::Command {
            step,
            kind: FailureKind::classify(&detail),
            detail,
        }
    }

    /// Failure kind of a git command error, `None` for everything else
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            PromoteError::Command { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            PromoteError::Config(_) => 2,
            PromoteError::Command { kind, .. } => match kind {
                FailureKind::Conflict => 3,
                FailureKind::AuthFailure => 4,
                FailureKind::TransientNetwork => 5,
                FailureKind::Unknown => 1,
            },
            _ => 1,
        }
    }
}
