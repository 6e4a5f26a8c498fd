//! The stack topology engine.
//!
//! Branch relationships are stored flat, one [BranchRecord] per branch, each naming its parent
//! and its children. [StackTree] builds a [StackView] from the store on demand, mutates the
//! parent/child links, and renders stacks for the terminal.

use crate::{
    errors::{StError, StResult},
    store::{BranchRecord, MetadataStore},
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

mod fmt;
pub use fmt::DisplayBranch;

mod traverse;

/// A pull request opened for a branch.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PullRequestRef {
    /// The number of the pull request.
    pub number: u64,
    /// The web URL of the pull request.
    pub url: Option<String>,
}

/// A branch known to `stax`, rebuilt from its [BranchRecord].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BranchNode {
    /// The branch name.
    pub name: String,
    /// The parent branch. [None] if the branch is the root of its stack.
    pub parent: Option<String>,
    /// The child branches, in insertion order.
    pub children: Vec<String>,
    /// The pull request opened for the branch, if any.
    pub pull_request: Option<PullRequestRef>,
    /// When the branch was last synchronized.
    pub last_synced: Option<DateTime<Utc>>,
}

impl BranchNode {
    /// Creates a [BranchNode] named `name` from its stored record.
    pub fn from_record(name: String, record: BranchRecord) -> Self {
        let mut children = Vec::with_capacity(record.children.len());
        for child in record.children {
            if !children.contains(&child) {
                children.push(child);
            }
        }

        Self {
            name,
            parent: record.parent,
            children,
            pull_request: record.pr.map(|number| PullRequestRef {
                number,
                url: record.pr_url,
            }),
            last_synced: record.last_synced,
        }
    }
}

/// A resolved view of the stack containing one branch.
///
/// `nodes` holds every known branch, not only the ones in this stack.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StackView {
    /// The topmost ancestor of `current_branch`.
    pub root: String,
    /// Every known branch, keyed by name.
    pub nodes: HashMap<String, BranchNode>,
    /// The branch the view was resolved for.
    pub current_branch: String,
}

impl StackView {
    /// Builds a view of the stack containing `branch` from `nodes`.
    ///
    /// ## Returns
    /// - `Ok(view)` - The root was found by following parent links from `branch`.
    /// - `Err(StError::TopologyCorruption)` - A branch was revisited before a parentless branch
    ///   was reached.
    pub fn new(nodes: HashMap<String, BranchNode>, branch: &str) -> StResult<Self> {
        let root = find_root(&nodes, branch)?;
        Ok(Self {
            root,
            nodes,
            current_branch: branch.to_string(),
        })
    }

    /// Gets a branch by name.
    pub fn get(&self, branch_name: &str) -> Option<&BranchNode> {
        self.nodes.get(branch_name)
    }

    /// Returns the children of `branch_name` that are really linked to it: each one has a stored
    /// node, and that node names `branch_name` as its parent. Dangling or stale entries left by an
    /// interrupted update are skipped.
    pub fn linked_children(&self, branch_name: &str) -> Vec<&str> {
        let Some(node) = self.nodes.get(branch_name) else {
            return Vec::new();
        };

        node.children
            .iter()
            .filter(|child| {
                let linked = self
                    .nodes
                    .get(child.as_str())
                    .is_some_and(|c| c.parent.as_deref() == Some(branch_name));
                if !linked {
                    debug!(parent = branch_name, child = %child, "skipping unlinked child");
                }
                linked
            })
            .map(String::as_str)
            .collect()
    }
}

/// Follows parent links from `branch` to the root of its stack.
///
/// A branch with no node is its own root. A visited set bounds the walk by the number of known
/// branches.
fn find_root(nodes: &HashMap<String, BranchNode>, branch: &str) -> StResult<String> {
    let mut root = branch;
    let mut visited = HashSet::new();
    let mut path = Vec::new();

    while let Some(parent) = nodes.get(root).and_then(|n| n.parent.as_deref()) {
        path.push(root.to_string());
        if !visited.insert(root) {
            warn!(branch, ?path, "cycle detected in stack metadata");
            return Err(StError::TopologyCorruption {
                branch: branch.to_string(),
                path,
            });
        }
        root = parent;
    }

    Ok(root.to_string())
}

/// The stack topology engine, operating on an explicit [MetadataStore] handle.
pub struct StackTree<'a, S: MetadataStore> {
    store: &'a mut S,
}

impl<'a, S: MetadataStore> StackTree<'a, S> {
    /// Creates a new [StackTree] backed by `store`.
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Loads every stored branch and resolves the stack containing `branch_name`.
    pub fn resolve(&self, branch_name: &str) -> StResult<StackView> {
        let nodes = self
            .store
            .branches()?
            .into_iter()
            .map(|(name, record)| (name.clone(), BranchNode::from_record(name, record)))
            .collect::<HashMap<_, _>>();

        StackView::new(nodes, branch_name)
    }

    /// Adds `branch_name` to the stack as a child of `parent_name`.
    ///
    /// The branch's record is written first, then the parent's children. If `parent_name` has no
    /// record, the child link is not recorded and no error is returned.
    ///
    /// ## Takes
    /// - `branch_name` - The name of the branch to add. The git branch must already exist.
    /// - `parent_name` - The name of the parent branch.
    pub fn add_to_stack(&mut self, branch_name: &str, parent_name: &str) -> StResult<()> {
        self.store.save_branch(
            branch_name,
            BranchRecord::new(Some(parent_name.to_string())),
        )?;

        match self.store.branch(parent_name)? {
            Some(mut parent) => {
                if !parent.children.iter().any(|c| c == branch_name) {
                    parent.children.push(branch_name.to_string());
                    self.store.save_branch(parent_name, parent)?;
                }
            }
            None => {
                debug!(
                    branch = branch_name,
                    parent = parent_name,
                    "parent is not tracked; child link not recorded"
                );
            }
        }

        Ok(())
    }

    /// Removes `branch_name` from its stack.
    ///
    /// The branch is spliced out of its parent's children, then its record is deleted. Its own
    /// children are not re-parented and keep pointing at the removed branch.
    ///
    /// ## Returns
    /// - `Ok(Some(record))` - The removed record.
    /// - `Ok(None)` - The branch had no record.
    pub fn remove_from_stack(&mut self, branch_name: &str) -> StResult<Option<BranchRecord>> {
        let Some(record) = self.store.branch(branch_name)? else {
            return Ok(None);
        };

        if let Some(parent_name) = record.parent.as_deref() {
            if let Some(mut parent) = self.store.branch(parent_name)? {
                parent.children.retain(|c| c != branch_name);
                self.store.save_branch(parent_name, parent)?;
            }
        }

        self.store.remove_branch(branch_name)?;
        Ok(Some(record))
    }

    /// Records the pull request opened for `branch_name`.
    pub fn attach_pull_request(&mut self, branch_name: &str, number: u64, url: &str) -> StResult<()> {
        let mut record = self
            .store
            .branch(branch_name)?
            .ok_or_else(|| StError::MissingBranchMetadata(branch_name.to_string()))?;

        record.pr = Some(number);
        record.pr_url = Some(url.to_string());
        record.last_synced = Some(Utc::now());
        self.store.save_branch(branch_name, record)
    }

    /// Stamps `branch_name` as synchronized now. Untracked branches are left alone.
    pub fn mark_synced(&mut self, branch_name: &str) -> StResult<()> {
        if let Some(mut record) = self.store.branch(branch_name)? {
            record.last_synced = Some(Utc::now());
            self.store.save_branch(branch_name, record)?;
        }
        Ok(())
    }

    /// Returns the ancestors of `branch_name`, root first.
    pub fn upstream_of(&self, branch_name: &str) -> StResult<Vec<String>> {
        Ok(self.resolve(branch_name)?.upstream_of(branch_name))
    }

    /// Returns the descendants of `branch_name`, parents before their children.
    pub fn downstream_of(&self, branch_name: &str) -> StResult<Vec<String>> {
        Ok(self.resolve(branch_name)?.downstream_of(branch_name))
    }

    /// Renders the stack containing `branch_name` as a tree, marking `branch_name`.
    ///
    /// Returns an empty string when the root of the stack has no stored node.
    pub fn render(&self, branch_name: &str, colored: bool) -> StResult<String> {
        let lines = self.resolve(branch_name)?.display_branches(colored);
        Ok(lines
            .iter()
            .map(|l| l.display_value.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Returns the rendered lines of the stack containing `branch_name`, paired with their
    /// branch names.
    pub fn display_branches(&self, branch_name: &str) -> StResult<Vec<DisplayBranch>> {
        Ok(self.resolve(branch_name)?.display_branches(true))
    }
}
