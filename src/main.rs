use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use git_promote::cli::{run_promote_workflow, PromoteWorkflowArgs};
use git_promote::config::{self, BuildEnvironment};
use git_promote::dispatch::Outcome;
use git_promote::domain::PROMOTION_CHAIN;
use git_promote::{ui, PromoteError};

#[derive(clap::Parser)]
#[command(
    name = "git-promote",
    about = "Promote the CI branch to the next branch of the merge chain"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Promote this branch instead of $TRAVIS_BRANCH")]
    branch: Option<String>,

    #[arg(short, long, help = "Clone into this directory instead of a temporary one")]
    work_dir: Option<PathBuf>,

    #[arg(long, help = "Merge locally without pushing or notifying")]
    dry_run: bool,

    #[arg(long, help = "Show the promotion chain and exit")]
    chain: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    if args.version {
        println!("git-promote {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    if args.chain {
        ui::display_promotion_chain(&PROMOTION_CHAIN);
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(outcome) => {
            ui::display_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            ui::display_error(&format!("{:#}", err));
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<Outcome> {
    let config = config::load_config(args.config.as_deref())?;
    // Missing CI variables are fatal before anything touches git.
    let env = BuildEnvironment::from_env()?;

    let workflow_args = PromoteWorkflowArgs {
        branch: args.branch,
        work_dir: args.work_dir,
        dry_run: args.dry_run,
    };

    run_promote_workflow(&workflow_args, &config, env)
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<PromoteError>()
        .map_or(1, PromoteError::exit_code)
}
