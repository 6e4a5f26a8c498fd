//! `submit` subcommand.

use crate::{
    config::StConfig,
    constants::DEFAULT_REMOTE,
    ctx::StContext,
    errors::{StError, StResult},
    host::{CodeHost, GitHubHost},
    output,
    submit::{SubmitAction, SubmitOptions, Submitter},
};
use clap::Args;
use nu_ansi_term::Color;
use tracing::debug;

/// CLI arguments for the `submit` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct SubmitCmd {
    /// Title of the pull request.
    #[clap(short, long)]
    title: Option<String>,
    /// Description of the pull request.
    #[clap(short, long)]
    body: Option<String>,
    /// Branch to merge into. Defaults to the branch's parent, then the trunk.
    #[clap(long)]
    base: Option<String>,
    /// Open the pull request as a draft.
    #[clap(long)]
    draft: bool,
    /// The remote to push to.
    #[clap(long, default_value = DEFAULT_REMOTE)]
    remote: String,
    /// GitHub token, used when none is stored with `stax auth`.
    #[clap(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
}

impl SubmitCmd {
    /// Run the `submit` subcommand.
    pub async fn run(self, mut ctx: StContext<'_>) -> StResult<()> {
        // Establish the GitHub API client.
        let token = StConfig::load()?
            .token(self.github_token)
            .ok_or(StError::NotAuthenticated)?;
        let host = GitHubHost::new(&token)?;
        let slug = ctx.slug()?;
        let trunk = ctx.trunk()?;

        // Verify the token can see the repository before pushing anything.
        let remote_repository = host.repository(&slug).await?;
        debug!(repository = %remote_repository.full_name, "resolved remote repository");

        let options = SubmitOptions {
            title: self.title,
            body: self.body,
            base: self.base,
            draft: self.draft,
        };
        let repository = ctx.repository;
        let report = Submitter::new(
            &mut ctx.store,
            repository,
            &host,
            &slug,
            &trunk,
            &self.remote,
        )
        .run(options)
        .await?;

        let verb = match report.action {
            SubmitAction::Created => "created",
            SubmitAction::Updated => "updated",
        };
        output::success(format!(
            "Pull request {}: #{}",
            verb, report.pull_request.number
        ));
        output::info(format!(
            "URL: {}",
            Color::Blue.paint(&report.pull_request.url)
        ));
        output::info(format!(
            "Base: {} <- Head: {}",
            Color::Yellow.paint(&report.base),
            Color::Green.paint(&report.branch)
        ));
        Ok(())
    }
}
