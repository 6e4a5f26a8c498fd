//! Synchronization of a whole stack with its remote counterparts.
//!
//! The working checkout is a single shared resource, so branches are synchronized one at a time:
//! check out, pull, move on. A failure on one branch is recorded and the pass continues. Whatever
//! happens during the pass, the original branch is checked out again at the end; only a failure
//! of that final checkout is fatal.

use crate::{
    errors::{StError, StResult},
    git::RepositoryExt,
    store::MetadataStore,
    tree::StackTree,
};
use itertools::Itertools;
use tracing::{error, info, warn};

/// A branch that could not be synchronized.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BranchFailure {
    /// The branch that failed.
    pub branch: String,
    /// Why it failed.
    pub reason: String,
}

/// The overall result of a synchronization pass.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SyncOutcome {
    /// Every branch was synchronized.
    Synced,
    /// Some branches were synchronized and the named ones failed.
    PartiallySynced {
        /// The branches that failed, in sync order.
        failed: Vec<String>,
    },
    /// No branch could be synchronized.
    Failed,
    /// The original branch could not be checked out again after the pass.
    RecoveryFailed {
        /// The branch that was checked out when the pass started.
        original: String,
        /// The branch checked out now, if it can still be determined.
        actual: Option<String>,
    },
}

impl SyncOutcome {
    /// Returns the process exit code for the outcome: `0` for full success, `2` for partial
    /// success, and `1` for total failure or a failed return to the original branch.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Synced => 0,
            Self::PartiallySynced { .. } => 2,
            Self::Failed | Self::RecoveryFailed { .. } => 1,
        }
    }
}

/// A report of a synchronization pass.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SyncReport {
    /// Every branch the pass visited, in order.
    pub affected: Vec<String>,
    /// The branches that failed, in order.
    pub failures: Vec<BranchFailure>,
    /// The classified outcome.
    pub outcome: SyncOutcome,
}

/// Drives a [RepositoryExt] through an update pass over the stack containing the checked out
/// branch.
pub struct Synchronizer<'a, S: MetadataStore, G: RepositoryExt> {
    tree: StackTree<'a, S>,
    repository: &'a G,
    remote: &'a str,
}

impl<'a, S: MetadataStore, G: RepositoryExt> Synchronizer<'a, S, G> {
    /// Creates a new [Synchronizer].
    ///
    /// ## Takes
    /// - `store` - The branch metadata store.
    /// - `repository` - The version-control adapter.
    /// - `remote` - The remote to fetch and pull from.
    pub fn new(store: &'a mut S, repository: &'a G, remote: &'a str) -> Self {
        Self {
            tree: StackTree::new(store),
            repository,
            remote,
        }
    }

    /// Synchronizes every branch in the stack containing the checked out branch.
    ///
    /// ## Returns
    /// - `Ok(report)` - The pass ran. The report's outcome may still be a failure.
    /// - `Err(_)` - A precondition failed before any branch was touched (dirty working tree,
    ///   fetch failure, corrupted metadata), or the pass hit an unexpected fault after which the
    ///   original branch was restored.
    pub fn run(&mut self) -> StResult<SyncReport> {
        let status = self.repository.status()?;
        if !status.clean {
            return Err(StError::WorkingTreeDirty);
        }
        let original = status.current_branch;

        info!(remote = self.remote, "fetching");
        self.repository.fetch(self.remote)?;

        let affected = self.affected_branches(&original)?;
        info!(count = affected.len(), "syncing branches in stack");

        let mut failures = Vec::new();
        let pass = self.sync_all(&affected, &mut failures);

        // Always attempt to return to the original branch, exactly once.
        if let Err(e) = self.repository.checkout_branch(&original) {
            let actual = self.repository.current_branch_name().ok();
            error!(
                original = %original,
                actual = ?actual,
                error = %e,
                "failed to return to the original branch"
            );
            return Ok(SyncReport {
                affected,
                failures,
                outcome: SyncOutcome::RecoveryFailed { original, actual },
            });
        }
        pass?;

        let outcome = if failures.is_empty() {
            SyncOutcome::Synced
        } else if failures.len() == affected.len() {
            SyncOutcome::Failed
        } else {
            SyncOutcome::PartiallySynced {
                failed: failures.iter().map(|f| f.branch.clone()).collect(),
            }
        };

        Ok(SyncReport {
            affected,
            failures,
            outcome,
        })
    }

    /// Returns the ancestors of `branch` (root first), `branch` itself, then its descendants in
    /// pre-order.
    pub fn affected_branches(&self, branch: &str) -> StResult<Vec<String>> {
        let view = self.tree.resolve(branch)?;
        let mut affected = view.upstream_of(branch);
        affected.push(branch.to_string());
        affected.extend(view.downstream_of(branch));
        Ok(affected)
    }

    /// Synchronizes each of `branches` in order, recording per-branch failures in `failures`.
    ///
    /// Only failures outside the per-branch git operations (such as failing to persist a sync
    /// timestamp) abort the pass.
    fn sync_all(&mut self, branches: &[String], failures: &mut Vec<BranchFailure>) -> StResult<()> {
        for branch in branches {
            match self.sync_branch(branch) {
                Ok(()) => {
                    info!(branch = %branch, "synced");
                    self.tree.mark_synced(branch)?;
                }
                Err(e) => {
                    warn!(branch = %branch, error = %e, "failed to sync branch");
                    failures.push(BranchFailure {
                        branch: branch.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !failures.is_empty() {
            warn!(
                failed = %failures.iter().map(|f| f.branch.as_str()).join(", "),
                "sync finished with failures"
            );
        }
        Ok(())
    }

    /// Checks out `branch` and pulls its remote counterpart.
    fn sync_branch(&self, branch: &str) -> StResult<()> {
        self.repository.checkout_branch(branch)?;
        self.repository.pull(self.remote, Some(branch))
    }
}
