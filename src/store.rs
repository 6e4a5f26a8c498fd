//! The branch metadata store for `stax`.
//!
//! The store is the single source of truth for stack structure. [StackTree] rebuilds its view of
//! the tree from it on every resolution.
//!
//! [StackTree]: crate::tree::StackTree

use crate::{
    constants::{STORE_FILE_NAME, STORE_VERSION},
    errors::StResult,
};
use chrono::{DateTime, Utc};
use git2::Repository;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::debug;

/// The persisted metadata for a single tracked branch.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BranchRecord {
    /// The name of the parent branch. [None] for the root of a stack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// The names of the child branches, in insertion order.
    #[serde(default)]
    pub children: Vec<String>,
    /// The number of the pull request opened for the branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr: Option<u64>,
    /// The URL of the pull request opened for the branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    /// When the branch was last synchronized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
}

impl BranchRecord {
    /// Creates a new [BranchRecord] with the given parent and no children.
    pub fn new(parent: Option<String>) -> Self {
        Self {
            parent,
            last_synced: Some(Utc::now()),
            ..Default::default()
        }
    }
}

/// The code-host repository a local repository is linked to.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RepositoryRecord {
    /// The owner of the remote repository.
    pub owner: String,
    /// The name of the remote repository.
    pub name: String,
    /// The default (trunk) branch of the repository.
    pub default_branch: String,
}

/// The on-disk layout of the repository-local store.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreFile {
    /// The version of `stax` that initialized the store.
    pub version: String,
    /// The linked code-host repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryRecord>,
    /// Every tracked branch, keyed by name.
    #[serde(default)]
    pub stacks: BTreeMap<String, BranchRecord>,
}

/// A keyed store of [BranchRecord]s.
///
/// Writes are independent; the store offers no transactions spanning more than one record.
pub trait MetadataStore {
    /// Returns every stored record, keyed by branch name.
    fn branches(&self) -> StResult<BTreeMap<String, BranchRecord>>;

    /// Returns the record for `name`, if one is stored.
    fn branch(&self, name: &str) -> StResult<Option<BranchRecord>>;

    /// Stores `record` under `name`, replacing any existing record.
    fn save_branch(&mut self, name: &str, record: BranchRecord) -> StResult<()>;

    /// Removes the record stored under `name`. Removing a missing record is a no-op.
    fn remove_branch(&mut self, name: &str) -> StResult<()>;
}

/// A [MetadataStore] persisted as TOML inside the repository's git directory.
#[derive(Debug)]
pub struct TomlStore {
    path: PathBuf,
    file: StoreFile,
}

impl TomlStore {
    /// Opens the store at `path`.
    ///
    /// ## Returns
    /// - `Ok(Some(store))` - The store was read successfully.
    /// - `Ok(None)` - No store exists at `path`; the repository is not initialized.
    /// - `Err(_)` - The store exists but could not be read or decoded.
    pub fn open(path: impl Into<PathBuf>) -> StResult<Option<Self>> {
        let path = path.into();
        if !path.exists() {
            return Ok(None);
        }

        let file: StoreFile = toml::from_str(&std::fs::read_to_string(&path)?)?;
        debug!(path = %path.display(), branches = file.stacks.len(), "loaded store");
        Ok(Some(Self { path, file }))
    }

    /// Creates a fresh store at `path` linked to `repository`, with the trunk branch recorded as
    /// the root of its own stack.
    pub fn initialize(path: impl Into<PathBuf>, repository: RepositoryRecord) -> StResult<Self> {
        let trunk = repository.default_branch.clone();
        let mut store = Self {
            path: path.into(),
            file: StoreFile {
                version: STORE_VERSION.to_string(),
                repository: Some(repository),
                stacks: BTreeMap::new(),
            },
        };
        store.file.stacks.insert(trunk, BranchRecord::new(None));
        store.persist()?;
        Ok(store)
    }

    /// Returns the linked code-host repository, if one is recorded.
    pub fn repository(&self) -> Option<&RepositoryRecord> {
        self.file.repository.as_ref()
    }

    /// Returns the path the store is persisted at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the store to disk.
    fn persist(&self) -> StResult<()> {
        let serialized = toml::to_string_pretty(&self.file)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }
}

impl MetadataStore for TomlStore {
    fn branches(&self) -> StResult<BTreeMap<String, BranchRecord>> {
        Ok(self.file.stacks.clone())
    }

    fn branch(&self, name: &str) -> StResult<Option<BranchRecord>> {
        Ok(self.file.stacks.get(name).cloned())
    }

    fn save_branch(&mut self, name: &str, record: BranchRecord) -> StResult<()> {
        self.file.stacks.insert(name.to_string(), record);
        self.persist()
    }

    fn remove_branch(&mut self, name: &str) -> StResult<()> {
        if self.file.stacks.remove(name).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Returns the path to the [TomlStore] for the given [Repository].
pub fn store_path(repository: &Repository) -> PathBuf {
    repository.path().join(STORE_FILE_NAME)
}

/// An in-memory [MetadataStore], counting writes so tests can observe the non-atomic window.
#[cfg(test)]
#[derive(Default, Debug, Clone)]
pub(crate) struct MemoryStore {
    pub(crate) records: BTreeMap<String, BranchRecord>,
    pub(crate) writes: usize,
    /// Fails every write with an I/O error when set.
    pub(crate) fail_writes: bool,
}

#[cfg(test)]
impl MemoryStore {
    /// Builds a store from `(branch, parent)` pairs, linking each branch into its parent's
    /// children in the order given.
    pub(crate) fn with_tree(edges: &[(&str, Option<&str>)]) -> Self {
        let mut records = BTreeMap::new();
        for (name, parent) in edges {
            records.insert(
                name.to_string(),
                BranchRecord {
                    parent: parent.map(ToString::to_string),
                    ..Default::default()
                },
            );
        }
        for (name, parent) in edges {
            if let Some(parent) = parent.and_then(|p| records.get_mut(p)) {
                parent.children.push(name.to_string());
            }
        }
        Self {
            records,
            ..Default::default()
        }
    }

    /// Makes every subsequent write fail.
    pub(crate) fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    fn check_writable(&self) -> StResult<()> {
        if self.fail_writes {
            return Err(crate::errors::StError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
impl MetadataStore for MemoryStore {
    fn branches(&self) -> StResult<BTreeMap<String, BranchRecord>> {
        Ok(self.records.clone())
    }

    fn branch(&self, name: &str) -> StResult<Option<BranchRecord>> {
        Ok(self.records.get(name).cloned())
    }

    fn save_branch(&mut self, name: &str, record: BranchRecord) -> StResult<()> {
        self.check_writable()?;
        self.writes += 1;
        self.records.insert(name.to_string(), record);
        Ok(())
    }

    fn remove_branch(&mut self, name: &str) -> StResult<()> {
        self.check_writable()?;
        self.writes += 1;
        self.records.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{BranchRecord, MetadataStore, RepositoryRecord, TomlStore};
    use crate::constants::STORE_FILE_NAME;

    fn repository_record() -> RepositoryRecord {
        RepositoryRecord {
            owner: "clabby".to_string(),
            name: "stax".to_string(),
            default_branch: "main".to_string(),
        }
    }

    #[test]
    fn open_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlStore::open(dir.path().join(STORE_FILE_NAME)).unwrap();
        assert!(store.is_none());
    }

    #[test]
    fn initialize_records_trunk_as_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlStore::initialize(dir.path().join(STORE_FILE_NAME), repository_record())
            .unwrap();

        let trunk = store.branch("main").unwrap().unwrap();
        assert_eq!(trunk.parent, None);
        assert!(trunk.children.is_empty());
        assert_eq!(store.repository(), Some(&repository_record()));
    }

    #[test]
    fn mutations_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let mut store = TomlStore::initialize(&path, repository_record()).unwrap();

        let record = BranchRecord {
            parent: Some("main".to_string()),
            children: vec!["feat/b".to_string()],
            pr: Some(7),
            pr_url: Some("https://github.com/clabby/stax/pull/7".to_string()),
            ..BranchRecord::new(None)
        };
        store.save_branch("feat/a", record.clone()).unwrap();
        store.save_branch("scratch", BranchRecord::new(None)).unwrap();
        store.remove_branch("scratch").unwrap();

        let reopened = TomlStore::open(&path).unwrap().unwrap();
        assert_eq!(reopened.branch("feat/a").unwrap(), Some(record));
        assert_eq!(reopened.branch("scratch").unwrap(), None);
        assert_eq!(reopened.branches().unwrap().len(), 2);
    }

    #[test]
    fn reads_minimal_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        std::fs::write(
            &path,
            r#"
version = "1.0.0"

[stacks.main]
children = ["a"]

[stacks.a]
parent = "main"
"#,
        )
        .unwrap();

        let store = TomlStore::open(&path).unwrap().unwrap();
        assert!(store.repository().is_none());
        let a = store.branch("a").unwrap().unwrap();
        assert_eq!(a.parent.as_deref(), Some("main"));
        assert!(a.children.is_empty());
        assert_eq!(a.last_synced, None);
    }
}
