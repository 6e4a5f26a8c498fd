//! Utilities for interacting with `git` repositories for the `stax` application.

use crate::errors::{StError, StResult};
use git2::{build::CheckoutBuilder, BranchType, Repository, StatusOptions};
use std::{
    env,
    path::Path,
    process::{Command, Stdio},
};
use tracing::{debug, trace};

#[cfg(test)]
pub(crate) mod mock;

/// Returns the repository for the current working directory, and [None] if
/// the current working directory is not within a git repository or an error
/// occurs.
pub fn active_repository() -> Option<Repository> {
    Repository::discover(env::current_dir().ok()?).ok()
}

/// A snapshot of the working checkout.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RepoStatus {
    /// `true` if there are no staged, unstaged, or conflicted changes to tracked files.
    pub clean: bool,
    /// The name of the checked out branch.
    pub current_branch: String,
}

/// Extension trait for the [Repository] type to expose the version-control operations `stax`
/// drives.
///
/// Local operations go through libgit2. Operations that talk to a remote shell out to `git`,
/// so that the user's credential helpers and SSH configuration apply.
pub trait RepositoryExt {
    /// Returns the cleanliness of the working tree and the checked out branch.
    fn status(&self) -> StResult<RepoStatus>;

    /// Returns the name of the checked out branch.
    fn current_branch_name(&self) -> StResult<String>;

    /// Returns the names of all local branches.
    fn list_branches(&self) -> StResult<Vec<String>>;

    /// Returns `true` if a local branch named `name` exists.
    fn branch_exists(&self, name: &str) -> StResult<bool>;

    /// Creates a branch named `name` at `start_point` (or `HEAD`) and checks it out.
    ///
    /// ## Takes
    /// - `name` - The name of the branch to create.
    /// - `start_point` - The branch to start from. [None] starts from `HEAD`.
    fn create_branch(&self, name: &str, start_point: Option<&str>) -> StResult<()>;

    /// Checks out the local branch named `name`.
    fn checkout_branch(&self, name: &str) -> StResult<()>;

    /// Deletes the local branch named `name`.
    fn delete_branch(&self, name: &str) -> StResult<()>;

    /// Fetches all branches from `remote`.
    fn fetch(&self, remote: &str) -> StResult<()>;

    /// Pulls `branch` (or the checked out branch's upstream) from `remote` into the checked out
    /// branch.
    fn pull(&self, remote: &str, branch: Option<&str>) -> StResult<()>;

    /// Pushes `branch` to `remote`, optionally setting it as the upstream.
    fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> StResult<()>;

    /// Returns the default branch of `remote`, falling back to `main` or `master` when the
    /// remote's `HEAD` is unknown.
    fn default_branch(&self, remote: &str) -> StResult<String>;

    /// Returns the fetch URL of `remote`.
    fn remote_url(&self, remote: &str) -> StResult<String>;
}

impl RepositoryExt for Repository {
    fn status(&self) -> StResult<RepoStatus> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);
        let clean = self.statuses(Some(&mut opts))?.is_empty();

        Ok(RepoStatus {
            clean,
            current_branch: self.current_branch_name()?,
        })
    }

    fn current_branch_name(&self) -> StResult<String> {
        let head = self.head()?;
        if !head.is_branch() {
            return Err(StError::DetachedHead);
        }
        head.shorthand()
            .map(ToOwned::to_owned)
            .ok_or(StError::DetachedHead)
    }

    fn list_branches(&self) -> StResult<Vec<String>> {
        self.branches(Some(BranchType::Local))?
            .map(|b| -> StResult<Option<String>> {
                let (b, _) = b?;
                Ok(b.name()?.map(ToOwned::to_owned))
            })
            .filter_map(Result::transpose)
            .collect()
    }

    fn branch_exists(&self, name: &str) -> StResult<bool> {
        match self.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_branch(&self, name: &str, start_point: Option<&str>) -> StResult<()> {
        let target = match start_point {
            Some(start) => self
                .find_branch(start, BranchType::Local)?
                .get()
                .peel_to_commit()?,
            None => self.head()?.peel_to_commit()?,
        };
        self.branch(name, &target, false)?;
        self.checkout_branch(name)
    }

    fn checkout_branch(&self, name: &str) -> StResult<()> {
        let refname = format!("refs/heads/{}", name);
        let tree = self.revparse_single(&refname)?;

        self.checkout_tree(&tree, Some(CheckoutBuilder::new().safe()))?;
        self.set_head(&refname)?;
        debug!(branch = name, "checked out branch");

        Ok(())
    }

    fn delete_branch(&self, name: &str) -> StResult<()> {
        self.find_branch(name, BranchType::Local)?.delete()?;
        Ok(())
    }

    fn fetch(&self, remote: &str) -> StResult<()> {
        run_git(workdir(self)?, &["fetch", remote]).map(|_| ())
    }

    fn pull(&self, remote: &str, branch: Option<&str>) -> StResult<()> {
        let mut args = vec!["pull", remote];
        args.extend(branch);
        run_git(workdir(self)?, &args).map(|_| ())
    }

    fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> StResult<()> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("-u");
        }
        args.extend([remote, branch]);
        run_git(workdir(self)?, &args).map(|_| ())
    }

    fn default_branch(&self, remote: &str) -> StResult<String> {
        let remote_head = format!("refs/remotes/{}/HEAD", remote);
        if let Some(target) = self
            .find_reference(&remote_head)
            .ok()
            .and_then(|r| r.symbolic_target().map(ToOwned::to_owned))
        {
            let prefix = format!("refs/remotes/{}/", remote);
            return Ok(target.trim_start_matches(prefix.as_str()).to_string());
        }

        for candidate in ["main", "master"] {
            if self.branch_exists(candidate)? {
                return Ok(candidate.to_string());
            }
        }
        Ok("main".to_string())
    }

    fn remote_url(&self, remote: &str) -> StResult<String> {
        let found = self.find_remote(remote)?;
        found
            .url()
            .or_else(|| found.pushurl())
            .map(ToOwned::to_owned)
            .ok_or_else(|| StError::NotAGitHubRemote(remote.to_string()))
    }
}

/// Returns the working directory of `repository`, which `git` subprocesses run in.
fn workdir(repository: &Repository) -> StResult<&Path> {
    repository.workdir().ok_or(StError::NotARepository)
}

/// Runs `git` with `args` inside `cwd`, returning its standard output.
fn run_git(cwd: &Path, args: &[&str]) -> StResult<String> {
    trace!(?args, "running git");
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        return Err(StError::GitCommand {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod test {
    use super::RepositoryExt;
    use git2::{Repository, Signature};
    use std::path::Path;

    /// Creates a repository with a single commit on `main`.
    fn init_repository(path: &Path) -> Repository {
        let repository = Repository::init(path).unwrap();
        {
            let signature = Signature::now("stax", "stax@example.com").unwrap();
            let tree_id = repository.index().unwrap().write_tree().unwrap();
            let tree = repository.find_tree(tree_id).unwrap();
            repository
                .commit(
                    Some("refs/heads/main"),
                    &signature,
                    &signature,
                    "initial",
                    &tree,
                    &[],
                )
                .unwrap();
        }
        repository.set_head("refs/heads/main").unwrap();
        repository
    }

    #[test]
    fn local_branch_operations() {
        let dir = tempfile::tempdir().unwrap();
        let repository = init_repository(dir.path());

        assert_eq!(repository.current_branch_name().unwrap(), "main");
        assert!(repository.status().unwrap().clean);

        repository.create_branch("feat/a", Some("main")).unwrap();
        assert_eq!(repository.current_branch_name().unwrap(), "feat/a");
        assert!(repository.branch_exists("feat/a").unwrap());
        assert!(!repository.branch_exists("feat/b").unwrap());

        repository.checkout_branch("main").unwrap();
        repository.delete_branch("feat/a").unwrap();
        assert_eq!(repository.list_branches().unwrap(), vec!["main".to_string()]);
    }

    #[test]
    fn default_branch_falls_back_to_local_main() {
        let dir = tempfile::tempdir().unwrap();
        let repository = init_repository(dir.path());

        assert_eq!(repository.default_branch("origin").unwrap(), "main");
    }

    #[test]
    fn remote_url_of_configured_remote() {
        let dir = tempfile::tempdir().unwrap();
        let repository = init_repository(dir.path());
        repository
            .remote("origin", "git@github.com:clabby/stax.git")
            .unwrap();

        assert_eq!(
            repository.remote_url("origin").unwrap(),
            "git@github.com:clabby/stax.git"
        );
        assert!(repository.remote_url("upstream").is_err());
    }
}
