//! `delete` subcommand.

use crate::{
    ctx::StContext,
    errors::{StError, StResult},
    git::RepositoryExt,
    output,
    store::MetadataStore,
    tree::StackTree,
};
use clap::Args;
use itertools::Itertools;
use nu_ansi_term::Color;
use tracing::debug;

/// CLI arguments for the `delete` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct DeleteCmd {
    /// Name of the branch to delete.
    #[clap(index = 1)]
    branch_name: Option<String>,
    /// Skip the confirmation prompt.
    #[clap(short, long)]
    yes: bool,
}

impl DeleteCmd {
    /// Run the `delete` subcommand.
    pub fn run(self, mut ctx: StContext<'_>) -> StResult<()> {
        // Prompt the user for the name of the branch to delete, or use the provided name.
        let branch_name = match self.branch_name {
            Some(name) => name,
            None => {
                let branches = ctx.display_branches()?;
                inquire::Select::new("Select a branch to delete", branches)
                    .with_formatter(&|f| f.value.branch_name.clone())
                    .prompt()?
                    .branch_name
            }
        };
        let trunk = ctx.trunk()?;
        if branch_name == trunk {
            return Err(StError::CannotDeleteTrunkBranch);
        }

        // Ask for confirmation to prevent accidental deletion of local refs.
        if !self.yes {
            let confirm = inquire::Confirm::new(
                format!(
                    "Are you sure you want to delete branch `{}`?",
                    Color::Blue.paint(&branch_name)
                )
                .as_str(),
            )
            .with_default(false)
            .prompt()?;

            if !confirm {
                return Ok(());
            }
        }

        let orphans = delete_branch(&mut ctx.store, ctx.repository, &branch_name, &trunk)?;

        output::success(format!(
            "Deleted branch `{}`.",
            Color::Blue.paint(&branch_name)
        ));
        if !orphans.is_empty() {
            output::warn(format!(
                "Branches left without a tracked parent: {}. Re-track them with `stax track`.",
                orphans.iter().map(|b| format!("`{}`", b)).join(", ")
            ));
        }
        Ok(())
    }
}

/// Deletes the tracked branch `name` from git and from its stack.
///
/// If `name` is checked out, its parent (or `trunk`, when the parent no longer exists) is checked
/// out first.
///
/// ## Returns
/// - `Ok(orphans)` - The children of the deleted branch, which now point at a missing parent.
fn delete_branch<S: MetadataStore, G: RepositoryExt>(
    store: &mut S,
    repository: &G,
    name: &str,
    trunk: &str,
) -> StResult<Vec<String>> {
    if name == trunk {
        return Err(StError::CannotDeleteTrunkBranch);
    }
    if !repository.branch_exists(name)? {
        return Err(StError::BranchNotFound(name.to_string()));
    }
    let record = store
        .branch(name)?
        .ok_or_else(|| StError::BranchNotTracked(name.to_string()))?;

    // Check out another branch prior to deletion.
    if repository.current_branch_name()? == name {
        let target = match record.parent.as_deref() {
            Some(parent) if repository.branch_exists(parent)? => parent,
            _ => trunk,
        };
        debug!(branch = name, target, "leaving branch before deletion");
        repository.checkout_branch(target)?;
    }

    repository.delete_branch(name)?;
    StackTree::new(store).remove_from_stack(name)?;

    // Only children that still point back at the deleted branch are orphaned.
    let mut orphans = Vec::new();
    for child in record.children {
        if store.branch(&child)?.and_then(|c| c.parent).as_deref() == Some(name) {
            orphans.push(child);
        }
    }
    Ok(orphans)
}

#[cfg(test)]
mod test {
    use super::delete_branch;
    use crate::{
        errors::StError,
        git::mock::MockRepository,
        store::{MemoryStore, MetadataStore},
    };

    /// `main` -> `a` -> {`b`, `c`}
    fn fixture() -> MemoryStore {
        MemoryStore::with_tree(&[
            ("main", None),
            ("a", Some("main")),
            ("b", Some("a")),
            ("c", Some("a")),
        ])
    }

    #[test]
    fn deletes_leaf() {
        let mut store = fixture();
        let repository = MockRepository::new("main", &["main", "a", "b", "c"]);

        let orphans = delete_branch(&mut store, &repository, "c", "main").unwrap();

        assert!(orphans.is_empty());
        assert_eq!(*repository.calls.borrow(), vec!["delete c"]);
        assert!(store.branch("c").unwrap().is_none());
        assert_eq!(store.branch("a").unwrap().unwrap().children, vec!["b"]);
    }

    #[test]
    fn leaves_checked_out_branch_for_its_parent() {
        let mut store = fixture();
        let repository = MockRepository::new("b", &["main", "a", "b", "c"]);

        delete_branch(&mut store, &repository, "b", "main").unwrap();

        assert_eq!(repository.current(), "a");
        assert_eq!(*repository.calls.borrow(), vec!["checkout a", "delete b"]);
    }

    #[test]
    fn reports_orphaned_children() {
        let mut store = fixture();
        let repository = MockRepository::new("main", &["main", "a", "b", "c"]);

        let orphans = delete_branch(&mut store, &repository, "a", "main").unwrap();

        assert_eq!(orphans, vec!["b", "c"]);
        assert!(store.branch("main").unwrap().unwrap().children.is_empty());
    }

    #[test]
    fn refuses_trunk_and_untracked_branches() {
        let mut store = fixture();
        let repository = MockRepository::new("main", &["main", "a", "b", "c", "scratch"]);

        assert!(matches!(
            delete_branch(&mut store, &repository, "main", "main"),
            Err(StError::CannotDeleteTrunkBranch)
        ));
        assert!(matches!(
            delete_branch(&mut store, &repository, "scratch", "main"),
            Err(StError::BranchNotTracked(_))
        ));
        assert!(repository.calls.borrow().is_empty());
    }
}
