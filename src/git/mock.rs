//! A scripted [RepositoryExt] for tests.

use super::{RepoStatus, RepositoryExt};
use crate::errors::{StError, StResult};
use std::{
    cell::RefCell,
    collections::{BTreeSet, HashSet},
};

/// A [RepositoryExt] that records every call and fails on demand.
#[derive(Debug, Default)]
pub(crate) struct MockRepository {
    current: RefCell<String>,
    branches: RefCell<BTreeSet<String>>,
    dirty: bool,
    /// Every call made, formatted as `"<op> <args>"`.
    pub(crate) calls: RefCell<Vec<String>>,
    checkouts: RefCell<usize>,
    fail_checkout_calls: HashSet<usize>,
    fail_checkout_branches: HashSet<String>,
    fail_pull_branches: HashSet<String>,
    fail_fetch: bool,
    fail_current_branch: bool,
    push_stderr: Option<String>,
}

impl MockRepository {
    /// Creates a mock with `branches` existing locally and `current` checked out.
    pub(crate) fn new(current: &str, branches: &[&str]) -> Self {
        Self {
            current: RefCell::new(current.to_string()),
            branches: RefCell::new(branches.iter().map(ToString::to_string).collect()),
            ..Default::default()
        }
    }

    /// Marks the working tree as having uncommitted changes.
    pub(crate) fn dirty(mut self) -> Self {
        self.dirty = true;
        self
    }

    /// Makes every checkout of `branch` fail.
    pub(crate) fn fail_checkout_of(mut self, branch: &str) -> Self {
        self.fail_checkout_branches.insert(branch.to_string());
        self
    }

    /// Makes the `n`th checkout (zero-indexed, across all branches) fail.
    pub(crate) fn fail_checkout_call(mut self, n: usize) -> Self {
        self.fail_checkout_calls.insert(n);
        self
    }

    /// Makes pulling `branch` fail.
    pub(crate) fn fail_pull_of(mut self, branch: &str) -> Self {
        self.fail_pull_branches.insert(branch.to_string());
        self
    }

    /// Makes fetching fail.
    pub(crate) fn fail_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Makes pushing fail with `stderr`.
    pub(crate) fn fail_push_with(mut self, stderr: &str) -> Self {
        self.push_stderr = Some(stderr.to_string());
        self
    }

    /// Makes querying the current branch fail.
    pub(crate) fn fail_current_branch(mut self) -> Self {
        self.fail_current_branch = true;
        self
    }

    /// Returns the checked out branch.
    pub(crate) fn current(&self) -> String {
        self.current.borrow().clone()
    }

    /// Returns the recorded calls whose operation is `op`.
    pub(crate) fn calls_to(&self, op: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .cloned()
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn failure(command: &str) -> StError {
        StError::GitCommand {
            command: command.to_string(),
            stderr: "scripted failure".to_string(),
        }
    }
}

impl RepositoryExt for MockRepository {
    fn status(&self) -> StResult<RepoStatus> {
        Ok(RepoStatus {
            clean: !self.dirty,
            current_branch: self.current_branch_name()?,
        })
    }

    fn current_branch_name(&self) -> StResult<String> {
        if self.fail_current_branch {
            return Err(Self::failure("rev-parse --abbrev-ref HEAD"));
        }
        Ok(self.current())
    }

    fn list_branches(&self) -> StResult<Vec<String>> {
        Ok(self.branches.borrow().iter().cloned().collect())
    }

    fn branch_exists(&self, name: &str) -> StResult<bool> {
        Ok(self.branches.borrow().contains(name))
    }

    fn create_branch(&self, name: &str, start_point: Option<&str>) -> StResult<()> {
        self.record(format!("create {} {}", name, start_point.unwrap_or("HEAD")));
        self.branches.borrow_mut().insert(name.to_string());
        *self.current.borrow_mut() = name.to_string();
        Ok(())
    }

    fn checkout_branch(&self, name: &str) -> StResult<()> {
        self.record(format!("checkout {}", name));
        let n = {
            let mut checkouts = self.checkouts.borrow_mut();
            *checkouts += 1;
            *checkouts - 1
        };
        if self.fail_checkout_calls.contains(&n)
            || self.fail_checkout_branches.contains(name)
            || !self.branches.borrow().contains(name)
        {
            return Err(Self::failure(&format!("checkout {}", name)));
        }
        *self.current.borrow_mut() = name.to_string();
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> StResult<()> {
        self.record(format!("delete {}", name));
        self.branches.borrow_mut().remove(name);
        Ok(())
    }

    fn fetch(&self, remote: &str) -> StResult<()> {
        self.record(format!("fetch {}", remote));
        if self.fail_fetch {
            return Err(Self::failure(&format!("fetch {}", remote)));
        }
        Ok(())
    }

    fn pull(&self, remote: &str, branch: Option<&str>) -> StResult<()> {
        let branch = branch.map(ToOwned::to_owned).unwrap_or_else(|| self.current());
        self.record(format!("pull {} {}", remote, branch));
        if self.fail_pull_branches.contains(&branch) {
            return Err(Self::failure(&format!("pull {} {}", remote, branch)));
        }
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> StResult<()> {
        self.record(format!("push {} {} {}", remote, branch, set_upstream));
        match &self.push_stderr {
            Some(stderr) => Err(StError::GitCommand {
                command: format!("push {} {}", remote, branch),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }

    fn default_branch(&self, _: &str) -> StResult<String> {
        Ok("main".to_string())
    }

    fn remote_url(&self, _: &str) -> StResult<String> {
        Ok("git@github.com:clabby/stax.git".to_string())
    }
}
