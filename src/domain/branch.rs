use std::fmt;

/// Stage of the promotion chain a branch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchCategory {
    Fix,
    Feature,
    Test,
    PreMerge,
    Develop,
    PreMergeMaster,
    Unknown,
}

impl BranchCategory {
    /// Human readable name, matching the branch prefix where there is one
    pub fn name(&self) -> &'static str {
        match self {
            BranchCategory::Fix => "fix",
            BranchCategory::Feature => "feature",
            BranchCategory::Test => "test",
            BranchCategory::PreMerge => "pre-merge",
            BranchCategory::Develop => "develop",
            BranchCategory::PreMergeMaster => "pre-merge-master",
            BranchCategory::Unknown => "unknown",
        }
    }

    /// Branch names this category matches, e.g. `fix/<name>`
    pub fn pattern(&self) -> String {
        match self {
            BranchCategory::Develop | BranchCategory::PreMergeMaster => self.name().to_string(),
            BranchCategory::Unknown => "*".to_string(),
            _ => format!("{}/<name>", self.name()),
        }
    }
}

impl fmt::Display for BranchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a branch name. The first matching rule wins.
pub fn classify(branch: &str) -> BranchCategory {
    if branch == "develop" {
        BranchCategory::Develop
    } else if branch == "pre-merge-master" {
        BranchCategory::PreMergeMaster
    } else if branch.starts_with("fix/") {
        BranchCategory::Fix
    } else if branch.starts_with("feature/") {
        BranchCategory::Feature
    } else if branch.starts_with("test/") {
        BranchCategory::Test
    } else if branch.starts_with("pre-merge/") {
        BranchCategory::PreMerge
    } else {
        BranchCategory::Unknown
    }
}

/// Strip the namespace from a branch name.
///
/// Everything after the first `/` is kept, so `feature/a/b` yields `a/b`.
/// Names without a `/` are returned unchanged.
pub fn derive_name(branch: &str) -> &str {
    match branch.split_once('/') {
        Some((_, rest)) => rest,
        None => branch,
    }
}
