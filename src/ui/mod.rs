//! User interface module - console views of plans and results.
//!
//! - `formatter` - single line primitives
//! - This module - multi-line views built from them

use console::style;

use crate::boundary::BoundaryWarning;
use crate::dispatch::{Outcome, PromotionReport};
use crate::domain::{MergeStrategy, Promotion, PromotionRule, Target};

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_status, display_success, format_edge,
};

/// Print the promotion chain table.
pub fn display_promotion_chain(rules: &[PromotionRule]) {
    println!("{}", style("Promotion chain:").bold());
    for rule in rules {
        let target = match rule.target {
            Target::Namespace(prefix) => format!("{}<name>", prefix),
            Target::Fixed(name) => name.to_string(),
        };
        println!(
            "  {:<20} {}",
            format_edge(&rule.category.pattern(), &target),
            strategy_label(rule.strategy)
        );
    }
}

fn strategy_label(strategy: MergeStrategy) -> &'static str {
    match strategy {
        MergeStrategy::FastForwardOnly => "(fast-forward only)",
        MergeStrategy::ResetFromUpstream => "(reset, merge upstream, force push)",
    }
}

/// Print what is about to happen.
pub fn display_plan(promotion: &Promotion, dry_run: bool) {
    let mode = if dry_run { " [dry run]" } else { "" };
    display_status(&format!(
        "This is a {} branch, promoting {}{}",
        promotion.category,
        format_edge(&promotion.source, &promotion.destination),
        mode
    ));
}

/// Print the result of a run.
pub fn display_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Skipped { branch } => {
            display_boundary_warning(&BoundaryWarning::UnknownBranch {
                branch: branch.clone(),
            });
        }
        Outcome::Promoted(report) => display_report(report),
    }
}

fn display_report(report: &PromotionReport) {
    for warning in &report.warnings {
        display_boundary_warning(warning);
    }

    let promotion = &report.promotion;
    if report.pushed {
        display_success(&format!(
            "Promoted {} to {}",
            promotion.source, promotion.destination
        ));
    } else {
        display_success(&format!(
            "Merged {} into {} locally",
            promotion.source, promotion.destination
        ));
    }
}
