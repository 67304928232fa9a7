//! Domain logic - pure promotion rules independent of git operations

pub mod branch;
pub mod promotion;

pub use branch::{classify, derive_name, BranchCategory};
pub use promotion::{rule_for, MergeStrategy, Promotion, PromotionRule, Target, PROMOTION_CHAIN};
