//! `track` subcommand.

use crate::{
    ctx::StContext,
    errors::{StError, StResult},
    git::RepositoryExt,
    output,
    store::MetadataStore,
    tree::StackTree,
};
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `track` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct TrackCmd {
    /// Name of the branch to track. Defaults to the checked out branch.
    #[clap(index = 1)]
    branch_name: Option<String>,
    /// The parent of the branch. Prompted for when omitted.
    #[clap(short, long)]
    parent: Option<String>,
}

impl TrackCmd {
    /// Run the `track` subcommand.
    pub fn run(self, mut ctx: StContext<'_>) -> StResult<()> {
        let branch_name = match self.branch_name {
            Some(name) => name,
            None => ctx.repository.current_branch_name()?,
        };

        // Prompt the user to select the parent branch.
        let parent = match self.parent {
            Some(parent) => parent,
            None => {
                let branches = ctx.display_branches()?;
                let prompt = format!("Select the parent of `{}`", Color::Blue.paint(&branch_name));
                inquire::Select::new(prompt.as_str(), branches)
                    .with_formatter(&|f| f.value.branch_name.clone())
                    .prompt()?
                    .branch_name
            }
        };

        track_branch(&mut ctx.store, ctx.repository, &branch_name, &parent)?;

        output::success(format!(
            "Tracking `{}` on top of `{}`.",
            Color::Green.paint(&branch_name),
            Color::Yellow.paint(&parent)
        ));
        Ok(())
    }
}

/// Adds the existing branch `name` to the stack as a child of `parent`.
fn track_branch<S: MetadataStore, G: RepositoryExt>(
    store: &mut S,
    repository: &G,
    name: &str,
    parent: &str,
) -> StResult<()> {
    for branch in [name, parent] {
        if !repository.branch_exists(branch)? {
            return Err(StError::BranchNotFound(branch.to_string()));
        }
    }
    if store.branch(name)?.is_some() {
        return Err(StError::BranchAlreadyTracked(name.to_string()));
    }

    let mut tree = StackTree::new(store);

    // Orphans may still name `name` as their parent, so `parent` could descend from it.
    let view = tree.resolve(parent)?;
    if name == parent || view.upstream_of(parent).iter().any(|b| b == name) {
        return Err(StError::CyclicParent {
            branch: name.to_string(),
            parent: parent.to_string(),
        });
    }

    tree.add_to_stack(name, parent)
}

#[cfg(test)]
mod test {
    use super::track_branch;
    use crate::{
        errors::StError,
        git::mock::MockRepository,
        store::{MemoryStore, MetadataStore},
    };

    #[test]
    fn tracks_existing_branch() {
        let mut store = MemoryStore::with_tree(&[("main", None)]);
        let repository = MockRepository::new("feat", &["main", "feat"]);

        track_branch(&mut store, &repository, "feat", "main").unwrap();

        assert_eq!(store.branch("main").unwrap().unwrap().children, vec!["feat"]);
        assert!(repository.calls.borrow().is_empty());
    }

    #[test]
    fn rejects_tracked_or_missing_branches() {
        let mut store = MemoryStore::with_tree(&[("main", None), ("a", Some("main"))]);
        let repository = MockRepository::new("a", &["main", "a"]);

        assert!(matches!(
            track_branch(&mut store, &repository, "a", "main"),
            Err(StError::BranchAlreadyTracked(_))
        ));
        assert!(matches!(
            track_branch(&mut store, &repository, "ghost", "main"),
            Err(StError::BranchNotFound(ref b)) if b == "ghost"
        ));
    }

    #[test]
    fn rejects_parent_that_descends_from_branch() {
        // `a` was deleted from the stack, leaving `b` pointing at it.
        let mut store = MemoryStore::with_tree(&[("main", None), ("b", Some("a"))]);
        let repository = MockRepository::new("a", &["main", "a", "b"]);

        assert!(matches!(
            track_branch(&mut store, &repository, "a", "b"),
            Err(StError::CyclicParent { .. })
        ));
        assert!(matches!(
            track_branch(&mut store, &repository, "a", "a"),
            Err(StError::CyclicParent { .. })
        ));
        assert_eq!(store.writes, 0);
    }
}
