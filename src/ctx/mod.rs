//! The in-memory context of the `stax` application.

use crate::{
    errors::{StError, StResult},
    git::RepositoryExt,
    host::RepoSlug,
    store::{store_path, RepositoryRecord, TomlStore},
    tree::{DisplayBranch, StackTree},
};
use git2::Repository;

/// The in-memory context of the `stax` application: a repository and its branch metadata store.
pub struct StContext<'a> {
    /// The repository associated with the store.
    pub repository: &'a Repository,
    /// The branch metadata store for the repository.
    pub store: TomlStore,
}

impl<'a> StContext<'a> {
    /// Loads the store for the given [Repository], and assembles a [StContext].
    ///
    /// ## Returns
    /// - `Ok(Some(ctx))` - The repository is initialized.
    /// - `Ok(None)` - The repository has no store; run `stax init` first.
    pub fn try_load(repository: &'a Repository) -> StResult<Option<Self>> {
        Ok(TomlStore::open(store_path(repository))?.map(|store| Self { repository, store }))
    }

    /// Returns a [StackTree] over the context's store.
    pub fn tree(&mut self) -> StackTree<'_, TomlStore> {
        StackTree::new(&mut self.store)
    }

    /// Returns the linked code-host repository.
    pub fn repository_record(&self) -> StResult<&RepositoryRecord> {
        self.store.repository().ok_or(StError::MissingRepositoryConfig)
    }

    /// Returns the name of the trunk branch.
    pub fn trunk(&self) -> StResult<String> {
        Ok(self.repository_record()?.default_branch.clone())
    }

    /// Returns the `owner/name` of the linked code-host repository.
    pub fn slug(&self) -> StResult<RepoSlug> {
        let record = self.repository_record()?;
        Ok(RepoSlug::new(&record.owner, &record.name))
    }

    /// Gathers the rendered stack containing the checked out branch, for use in
    /// [inquire::Select] prompts. Falls back to the trunk's stack when the checked out branch is
    /// untracked.
    pub fn display_branches(&mut self) -> StResult<Vec<DisplayBranch>> {
        let current = self.repository.current_branch_name()?;
        let trunk = self.trunk()?;
        let tree = self.tree();

        let lines = tree.display_branches(&current)?;
        if !lines.is_empty() {
            return Ok(lines);
        }
        tree.display_branches(&trunk)
    }
}
