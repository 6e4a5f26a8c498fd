//! `init` subcommand.

use crate::{
    constants::DEFAULT_REMOTE,
    errors::{StError, StResult},
    git::RepositoryExt,
    output,
    store::{store_path, RepositoryRecord, TomlStore},
    validate::parse_github_url,
};
use clap::Args;
use git2::Repository;
use nu_ansi_term::Color;

/// CLI arguments for the `init` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct InitCmd {
    /// The trunk branch. Defaults to the remote's default branch.
    #[clap(short, long)]
    trunk: Option<String>,
    /// The GitHub remote to link.
    #[clap(short, long, default_value = DEFAULT_REMOTE)]
    remote: String,
}

impl InitCmd {
    /// Run the `init` subcommand.
    pub fn run(self, repository: &Repository) -> StResult<()> {
        let path = store_path(repository);
        if TomlStore::open(&path)?.is_some() {
            output::warn("`stax` is already initialized in this repository.");
            return Ok(());
        }

        let record = repository_record(repository, self.trunk, &self.remote)?;
        TomlStore::initialize(path, record.clone())?;

        output::success("`stax` initialized successfully!");
        output::info(format!(
            "Repository: {}",
            Color::Blue.paint(format!("{}/{}", record.owner, record.name))
        ));
        output::info(format!(
            "Trunk branch: {}",
            Color::Blue.paint(&record.default_branch)
        ));
        Ok(())
    }
}

/// Builds the [RepositoryRecord] for `remote`, which must point at GitHub.
fn repository_record<G: RepositoryExt>(
    repository: &G,
    trunk: Option<String>,
    remote: &str,
) -> StResult<RepositoryRecord> {
    let url = repository.remote_url(remote)?;
    let slug = parse_github_url(&url).ok_or_else(|| StError::NotAGitHubRemote(remote.to_string()))?;

    let default_branch = match trunk {
        Some(trunk) => {
            if !repository.branch_exists(&trunk)? {
                return Err(StError::BranchNotFound(trunk));
            }
            trunk
        }
        None => repository.default_branch(remote)?,
    };

    Ok(RepositoryRecord {
        owner: slug.owner,
        name: slug.name,
        default_branch,
    })
}
