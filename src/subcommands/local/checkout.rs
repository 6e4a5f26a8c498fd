//! `checkout` subcommand.

use crate::{
    ctx::StContext,
    errors::{StError, StResult},
    git::RepositoryExt,
    output,
};
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `checkout` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct CheckoutCmd {
    /// Name of the branch to check out. Prompted for when omitted.
    #[clap(index = 1)]
    branch_name: Option<String>,
}

impl CheckoutCmd {
    /// Run the `checkout` subcommand.
    pub fn run(self, mut ctx: StContext<'_>) -> StResult<()> {
        let branch_name = match self.branch_name {
            Some(name) => name,
            None => {
                let branches = ctx.display_branches()?;
                inquire::Select::new("Select a branch to checkout", branches)
                    .with_formatter(&|f| f.value.branch_name.clone())
                    .prompt()?
                    .branch_name
            }
        };

        if !ctx.repository.branch_exists(&branch_name)? {
            return Err(StError::BranchNotFound(branch_name));
        }
        ctx.repository.checkout_branch(&branch_name)?;

        output::success(format!(
            "Switched to branch `{}`.",
            Color::Blue.paint(&branch_name)
        ));
        Ok(())
    }
}
