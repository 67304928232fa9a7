use crate::domain::branch::{classify, derive_name, BranchCategory};

/// Where a promoted branch lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Keep the branch suffix, swap the namespace (`test/x` -> `feature/x`)
    Namespace(&'static str),
    /// Always the same branch
    Fixed(&'static str),
}

/// How the source gets into the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Clone the source branch, fast-forward the destination, plain push
    FastForwardOnly,
    /// Rebuild the destination from the default branch, merge the upstream
    /// ref with a merge commit and force-push
    ResetFromUpstream,
}

/// One edge of the promotion chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionRule {
    pub category: BranchCategory,
    pub target: Target,
    pub strategy: MergeStrategy,
}

/// The promotion chain: test -> feature -> pre-merge -> develop ->
/// pre-merge-master -> master, with fix joining at pre-merge.
pub const PROMOTION_CHAIN: [PromotionRule; 6] = [
    PromotionRule {
        category: BranchCategory::Test,
        target: Target::Namespace("feature/"),
        strategy: MergeStrategy::FastForwardOnly,
    },
    PromotionRule {
        category: BranchCategory::Feature,
        target: Target::Namespace("pre-merge/"),
        strategy: MergeStrategy::FastForwardOnly,
    },
    PromotionRule {
        category: BranchCategory::Fix,
        target: Target::Namespace("pre-merge/"),
        strategy: MergeStrategy::FastForwardOnly,
    },
    PromotionRule {
        category: BranchCategory::PreMerge,
        target: Target::Fixed("develop"),
        strategy: MergeStrategy::FastForwardOnly,
    },
    PromotionRule {
        category: BranchCategory::Develop,
        target: Target::Fixed("pre-merge-master"),
        strategy: MergeStrategy::ResetFromUpstream,
    },
    PromotionRule {
        category: BranchCategory::PreMergeMaster,
        target: Target::Fixed("master"),
        strategy: MergeStrategy::FastForwardOnly,
    },
];

/// Look up the chain edge leaving `category`
pub fn rule_for(category: BranchCategory) -> Option<&'static PromotionRule> {
    PROMOTION_CHAIN.iter().find(|rule| rule.category == category)
}

impl PromotionRule {
    /// Destination branch for a given source branch
    pub fn destination(&self, source: &str) -> String {
        match self.target {
            Target::Namespace(prefix) => format!("{}{}", prefix, derive_name(source)),
            Target::Fixed(name) => name.to_string(),
        }
    }
}

/// A fully resolved promotion step for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    pub category: BranchCategory,
    pub source: String,
    pub destination: String,
    /// Ref merged into the destination
    pub merge_ref: String,
    pub strategy: MergeStrategy,
}

impl Promotion {
    /// Plan the promotion for `source`, or `None` when the branch is not part
    /// of the chain.
    ///
    /// A bare namespace such as `fix/` has no name to carry over and is
    /// treated as outside the chain. `upstream_ref` is merged instead of the
    /// source for reset promotions.
    pub fn plan(source: &str, upstream_ref: &str) -> Option<Self> {
        let category = classify(source);
        let rule = rule_for(category)?;

        if matches!(rule.target, Target::Namespace(_)) && derive_name(source).is_empty() {
            return None;
        }

        let merge_ref = match rule.strategy {
            MergeStrategy::FastForwardOnly => source.to_string(),
            MergeStrategy::ResetFromUpstream => upstream_ref.to_string(),
        };

        Some(Promotion {
            category,
            source: source.to_string(),
            destination: rule.destination(source),
            merge_ref,
            strategy: rule.strategy,
        })
    }
}
