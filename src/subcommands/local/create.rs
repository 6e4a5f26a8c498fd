//! `create` subcommand.

use crate::{
    ctx::StContext,
    errors::{StError, StResult},
    git::RepositoryExt,
    output,
    store::MetadataStore,
    tree::StackTree,
    validate::validate_branch_name,
};
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `create` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct CreateCmd {
    /// Name of the new branch to create.
    #[clap(index = 1)]
    branch_name: Option<String>,
    /// The parent of the new branch. Defaults to the checked out branch.
    #[clap(short, long)]
    parent: Option<String>,
}

impl CreateCmd {
    /// Run the `create` subcommand.
    pub fn run(self, mut ctx: StContext<'_>) -> StResult<()> {
        // Prompt the user for the name of their new branch, or use the provided name.
        let branch_name = match self.branch_name {
            Some(name) => name,
            None => inquire::Text::new("Name of new branch:").prompt()?,
        };
        let parent = match self.parent {
            Some(parent) => parent,
            None => ctx.repository.current_branch_name()?,
        };

        create_branch(&mut ctx.store, ctx.repository, &branch_name, &parent)?;

        output::success(format!(
            "Created branch `{}` on top of `{}`.",
            Color::Green.paint(&branch_name),
            Color::Yellow.paint(&parent)
        ));
        output::info(format!("Checked out `{}`.", Color::Green.paint(&branch_name)));
        Ok(())
    }
}

/// Creates `name` on top of `parent`, checks it out, and tracks it as `parent`'s child.
fn create_branch<S: MetadataStore, G: RepositoryExt>(
    store: &mut S,
    repository: &G,
    name: &str,
    parent: &str,
) -> StResult<()> {
    validate_branch_name(name)?;
    if repository.branch_exists(name)? {
        return Err(StError::BranchAlreadyExists(name.to_string()));
    }
    if !repository.status()?.clean {
        return Err(StError::WorkingTreeDirty);
    }
    if !repository.branch_exists(parent)? {
        return Err(StError::BranchNotFound(parent.to_string()));
    }

    repository.create_branch(name, Some(parent))?;
    StackTree::new(store).add_to_stack(name, parent)
}
