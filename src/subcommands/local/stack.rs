//! `stack` subcommand.

use crate::{ctx::StContext, errors::StResult, git::RepositoryExt, output};
use clap::Args;

/// CLI arguments for the `stack` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct StackCmd {
    /// Show the stack containing this branch instead of the checked out one.
    #[clap(short, long)]
    branch: Option<String>,
}

impl StackCmd {
    /// Run the `stack` subcommand.
    pub fn run(self, mut ctx: StContext<'_>) -> StResult<()> {
        let branch = match self.branch {
            Some(branch) => branch,
            None => ctx.repository.current_branch_name()?,
        };

        let rendered = ctx.tree().render(&branch, true)?;
        if rendered.is_empty() {
            output::info("No stack found for this branch.");
        } else {
            output::log("\nBranch Stack:");
            output::log(rendered);
            output::log("");
        }
        Ok(())
    }
}
