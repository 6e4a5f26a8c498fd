//! The subcommands for the `stax` application.

use crate::{
    ctx::StContext,
    errors::{StError, StResult},
    git::active_repository,
};
use clap::Subcommand;
use git2::Repository;
use std::process::ExitCode;

mod local;
use local::{CheckoutCmd, CreateCmd, DeleteCmd, InitCmd, StackCmd, TrackCmd};

mod remote;
use remote::{AuthCmd, SubmitCmd, SyncCmd};

#[derive(Debug, Clone, Eq, PartialEq, Subcommand)]
pub enum Subcommands {
    /// Link the repository to its GitHub remote and start tracking stacks.
    Init(InitCmd),
    /// Store, verify, or remove the GitHub token.
    Auth(AuthCmd),
    /// Create a new branch on top of the checked out branch (or `--parent`) and track it.
    #[clap(alias = "c")]
    Create(CreateCmd),
    /// Track an existing branch as the child of another.
    #[clap(alias = "tr")]
    Track(TrackCmd),
    /// Delete a branch and remove it from its stack.
    #[clap(aliases = ["d", "del"])]
    Delete(DeleteCmd),
    /// Checkout a branch.
    #[clap(alias = "co")]
    Checkout(CheckoutCmd),
    /// Print the stack containing the checked out branch.
    #[clap(aliases = ["log", "ls"])]
    Stack(StackCmd),
    /// Push the checked out branch and open or update its pull request.
    #[clap(alias = "s")]
    Submit(SubmitCmd),
    /// Pull every branch in the checked out branch's stack from the remote.
    #[clap(alias = "sy")]
    Sync(SyncCmd),
}

impl Subcommands {
    /// Run the subcommand, discovering the repository and loading its store as needed.
    pub async fn run(self) -> StResult<ExitCode> {
        match self {
            // `auth` touches only the user-global configuration.
            Self::Auth(args) => args.run().await?,
            Self::Init(args) => args.run(&repository()?)?,
            Self::Create(args) => args.run(context(&repository()?)?)?,
            Self::Track(args) => args.run(context(&repository()?)?)?,
            Self::Delete(args) => args.run(context(&repository()?)?)?,
            Self::Checkout(args) => args.run(context(&repository()?)?)?,
            Self::Stack(args) => args.run(context(&repository()?)?)?,
            Self::Submit(args) => args.run(context(&repository()?)?).await?,
            Self::Sync(args) => return args.run(context(&repository()?)?),
        }
        Ok(ExitCode::SUCCESS)
    }
}

/// Discovers the repository containing the working directory.
fn repository() -> StResult<Repository> {
    active_repository().ok_or(StError::NotARepository)
}

/// Loads the context of an initialized repository.
fn context(repository: &Repository) -> StResult<StContext<'_>> {
    StContext::try_load(repository)?.ok_or(StError::NotInitialized)
}
