pub mod boundary;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod git;
pub mod notify;
pub mod ui;

pub use error::{PromoteError, Result};
