//! Error types for the `stax` application.

use nu_ansi_term::Color;
use thiserror::Error;

/// The category an [StError] belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    /// Bad user input. Nothing was corrupted.
    Validation,
    /// Missing or unreadable local state.
    Config,
    /// A version-control operation failed.
    Git,
    /// A call to the remote code host failed.
    CodeHost,
    /// The stored branch tree is structurally broken.
    TopologyCorruption,
}

/// An error that occurred while running `stax`.
#[derive(Error, Debug)]
pub enum StError {
    /// The branch name is empty.
    #[error("Branch name cannot be empty.")]
    EmptyBranchName,
    /// The branch name is not a valid git ref name.
    #[error("Invalid branch name: `{}`", Color::Blue.paint(.0))]
    InvalidBranchName(String),
    /// The branch already exists.
    #[error("Branch `{}` already exists.", Color::Blue.paint(.0))]
    BranchAlreadyExists(String),
    /// The branch does not exist.
    #[error("Branch `{}` does not exist.", Color::Blue.paint(.0))]
    BranchNotFound(String),
    /// The branch is already part of a stack.
    #[error("Branch `{}` is already tracked with `stax`.", Color::Blue.paint(.0))]
    BranchAlreadyTracked(String),
    /// The branch is not tracked with `stax`.
    #[error("Branch `{}` is not tracked with `stax`. Track it first with `stax track`.", Color::Blue.paint(.0))]
    BranchNotTracked(String),
    /// Tracking the branch under the parent would make the branch its own ancestor.
    #[error("Cannot track `{}` on top of `{}`: `{}` would become its own ancestor.", Color::Blue.paint(.branch), Color::Blue.paint(.parent), .branch)]
    CyclicParent {
        /// The branch being tracked.
        branch: String,
        /// The requested parent.
        parent: String,
    },
    /// Cannot delete the trunk branch.
    #[error("Cannot delete the trunk branch.")]
    CannotDeleteTrunkBranch,
    /// The working tree has uncommitted changes.
    #[error("Working directory has uncommitted changes. Please commit or stash them first.")]
    WorkingTreeDirty,
    /// The code-host token is malformed.
    #[error("Invalid GitHub token: {}", .0)]
    InvalidToken(String),
    /// An [inquire::InquireError] occurred.
    #[error("Prompt error: {}", .0)]
    Prompt(#[from] inquire::InquireError),

    /// The repository has not been initialized.
    #[error("Repository not initialized. Run `stax init` first.")]
    NotInitialized,
    /// No code-host token is available.
    #[error("Not authenticated. Run `stax auth --token <TOKEN>` first.")]
    NotAuthenticated,
    /// The repository record is missing from the store.
    #[error("Repository configuration not found. Run `stax init` again.")]
    MissingRepositoryConfig,
    /// The branch has no stored metadata.
    #[error("No metadata found for branch `{}`.", Color::Blue.paint(.0))]
    MissingBranchMetadata(String),
    /// The user's home directory could not be determined.
    #[error("Could not determine the home directory.")]
    MissingHomeDir,
    /// An [std::io::Error] occurred while reading or writing local state.
    #[error("I/O error: {}", .0)]
    Io(#[from] std::io::Error),
    /// Local state could not be decoded.
    #[error("Failed to decode local state: {}", .0)]
    Decode(#[from] toml::de::Error),
    /// Local state could not be encoded.
    #[error("Failed to encode local state: {}", .0)]
    Encode(#[from] toml::ser::Error),

    /// The current directory is not inside a git repository.
    #[error("Not a git repository. Please run `git init` first.")]
    NotARepository,
    /// `HEAD` does not point at a local branch.
    #[error("HEAD is detached. Check out a branch first.")]
    DetachedHead,
    /// The remote has no GitHub URL.
    #[error("Remote `{}` is not a GitHub repository.", .0)]
    NotAGitHubRemote(String),
    /// A [git2::Error] occurred.
    #[error("libgit2 error: {}", .0)]
    Git2(#[from] git2::Error),
    /// A `git` subprocess exited unsuccessfully.
    #[error("`git {command}` failed: {stderr}")]
    GitCommand {
        /// The arguments passed to `git`.
        command: String,
        /// The trimmed standard error of the subprocess.
        stderr: String,
    },

    /// An [octocrab::Error] occurred.
    #[error("GitHub API error: {}", .0)]
    Octocrab(#[from] octocrab::Error),
    /// The code host returned a response missing required data.
    #[error("GitHub API error: {}", .0)]
    CodeHost(String),

    /// A cycle or otherwise inconsistent tree was found while resolving a stack.
    #[error("Stack metadata is corrupted: cycle detected while resolving `{branch}` ({})", .path.join(" -> "))]
    TopologyCorruption {
        /// The branch the resolution started from.
        branch: String,
        /// The branches walked before a branch was revisited.
        path: Vec<String>,
    },
}

/// A [Result] alias with [StError] as the error type.
pub type StResult<T> = Result<T, StError>;

impl StError {
    /// Returns the [ErrorKind] of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyBranchName
            | Self::InvalidBranchName(_)
            | Self::BranchAlreadyExists(_)
            | Self::BranchNotFound(_)
            | Self::BranchAlreadyTracked(_)
            | Self::BranchNotTracked(_)
            | Self::CyclicParent { .. }
            | Self::CannotDeleteTrunkBranch
            | Self::WorkingTreeDirty
            | Self::InvalidToken(_)
            | Self::Prompt(_) => ErrorKind::Validation,
            Self::NotInitialized
            | Self::NotAuthenticated
            | Self::MissingRepositoryConfig
            | Self::MissingBranchMetadata(_)
            | Self::MissingHomeDir
            | Self::Io(_)
            | Self::Decode(_)
            | Self::Encode(_) => ErrorKind::Config,
            Self::NotARepository
            | Self::DetachedHead
            | Self::NotAGitHubRemote(_)
            | Self::Git2(_)
            | Self::GitCommand { .. } => ErrorKind::Git,
            Self::Octocrab(_) | Self::CodeHost(_) => ErrorKind::CodeHost,
            Self::TopologyCorruption { .. } => ErrorKind::TopologyCorruption,
        }
    }

    /// Returns `true` if the user can fix the error by changing their input.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Returns `true` if the error is a `git push` rejected only because the remote
    /// already has the branch's commits.
    pub fn is_up_to_date(&self) -> bool {
        match self {
            Self::GitCommand { stderr, .. } => {
                stderr.contains("up-to-date")
                    || stderr.contains("up to date")
                    || stderr.contains("nothing to commit")
            }
            _ => false,
        }
    }
}
