//! Entry point plumbing shared by the binary and integration tests

pub mod orchestration;

pub use orchestration::{run_promote_workflow, PromoteWorkflowArgs, WorkDir};
