//! `sync` subcommand.

use crate::{
    constants::DEFAULT_REMOTE,
    ctx::StContext,
    errors::StResult,
    output,
    sync::{SyncOutcome, Synchronizer},
};
use clap::Args;
use itertools::Itertools;
use nu_ansi_term::Color;
use std::process::ExitCode;

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct SyncCmd {
    /// The remote to fetch and pull from.
    #[clap(short, long, default_value = DEFAULT_REMOTE)]
    remote: String,
}

impl SyncCmd {
    /// Run the `sync` subcommand.
    ///
    /// Exits with `0` when every branch synced, `2` when only some did, and `1` otherwise.
    pub fn run(self, mut ctx: StContext<'_>) -> StResult<ExitCode> {
        output::info(format!("Fetching latest changes from `{}`...", self.remote));

        let repository = ctx.repository;
        let report = Synchronizer::new(&mut ctx.store, repository, &self.remote).run()?;

        for branch in &report.affected {
            match report.failures.iter().find(|f| &f.branch == branch) {
                Some(failure) => output::warn(format!(
                    "Failed to sync `{}`: {}",
                    Color::Blue.paint(branch),
                    failure.reason
                )),
                None => output::detail(format!("Synced `{}`", branch)),
            }
        }

        match &report.outcome {
            SyncOutcome::Synced => output::success(format!(
                "Stack synchronized successfully! ({} branches)",
                report.affected.len()
            )),
            SyncOutcome::PartiallySynced { failed } => output::warn(format!(
                "Stack synchronized with {} warning(s). Failed branches: {}",
                failed.len(),
                failed.iter().join(", ")
            )),
            SyncOutcome::Failed => output::error(format!(
                "Failed to sync all {} branch(es) in stack.",
                report.affected.len()
            )),
            SyncOutcome::RecoveryFailed { original, actual } => output::error(match actual {
                Some(actual) => format!(
                    "Unable to return to branch `{}`. Currently on branch `{}`.",
                    original, actual
                ),
                None => format!(
                    "Unable to return to branch `{}` and cannot determine the current branch.",
                    original
                ),
            }),
        }

        Ok(ExitCode::from(report.outcome.exit_code()))
    }
}
