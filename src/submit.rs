//! Submission of a branch as a pull request.

use crate::{
    errors::StResult,
    git::RepositoryExt,
    host::{CodeHost, CreatePullRequest, PullRequest, RepoSlug, UpdatePullRequest},
    store::MetadataStore,
    tree::StackTree,
};
use tracing::{debug, info};

/// Options for a submission. Unset fields fall back to defaults derived from the branch.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct SubmitOptions {
    /// The title of the pull request.
    pub title: Option<String>,
    /// The description of the pull request.
    pub body: Option<String>,
    /// The branch to merge into. Defaults to the branch's parent, then the trunk.
    pub base: Option<String>,
    /// Whether a newly created pull request is a draft.
    pub draft: bool,
}

/// What a submission did on the code host.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SubmitAction {
    /// A new pull request was opened.
    Created,
    /// An existing pull request was updated.
    Updated,
}

/// The result of a submission.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SubmitReport {
    /// The submitted branch.
    pub branch: String,
    /// The base branch of the pull request.
    pub base: String,
    /// The pull request as the code host reported it.
    pub pull_request: PullRequest,
    /// Whether the pull request was opened or updated.
    pub action: SubmitAction,
}

/// Pushes the checked out branch and opens or updates its pull request.
pub struct Submitter<'a, S: MetadataStore, G: RepositoryExt, H: CodeHost> {
    tree: StackTree<'a, S>,
    repository: &'a G,
    host: &'a H,
    slug: &'a RepoSlug,
    trunk: &'a str,
    remote: &'a str,
}

impl<'a, S: MetadataStore, G: RepositoryExt, H: CodeHost> Submitter<'a, S, G, H> {
    /// Creates a new [Submitter].
    pub fn new(
        store: &'a mut S,
        repository: &'a G,
        host: &'a H,
        slug: &'a RepoSlug,
        trunk: &'a str,
        remote: &'a str,
    ) -> Self {
        Self {
            tree: StackTree::new(store),
            repository,
            host,
            slug,
            trunk,
            remote,
        }
    }

    /// Submits the checked out branch.
    ///
    /// The branch is pushed with its upstream set; a push rejected only because the remote is
    /// already up to date is not an error. The pull request recorded for the branch, or else the
    /// first open pull request with the branch as its head, is updated. Otherwise a new one is
    /// opened. The pull request is then recorded on the branch, which must be tracked.
    pub async fn run(&mut self, options: SubmitOptions) -> StResult<SubmitReport> {
        let branch = self.repository.current_branch_name()?;
        let view = self.tree.resolve(&branch)?;
        let node = view.get(&branch);

        let base = options
            .base
            .clone()
            .or_else(|| node.and_then(|n| n.parent.clone()))
            .unwrap_or_else(|| self.trunk.to_string());

        match self.repository.push(self.remote, &branch, true) {
            Ok(()) => info!(branch = %branch, remote = self.remote, "pushed"),
            Err(e) if e.is_up_to_date() => debug!(branch = %branch, "already up to date"),
            Err(e) => return Err(e),
        }

        let existing = match node.and_then(|n| n.pull_request.as_ref()) {
            Some(pr) => Some(self.host.get_pull_request(self.slug, pr.number).await?),
            None => self
                .host
                .list_pull_requests(self.slug, Some(&branch))
                .await?
                .into_iter()
                .next(),
        };

        let (pull_request, action) = match existing {
            Some(pr) => {
                let update = UpdatePullRequest {
                    title: options.title.as_deref(),
                    body: options.body.as_deref(),
                    base: (pr.base != base).then_some(base.as_str()),
                };
                let pr = if update == UpdatePullRequest::default() {
                    pr
                } else {
                    self.host
                        .update_pull_request(self.slug, pr.number, update)
                        .await?
                };
                (pr, SubmitAction::Updated)
            }
            None => {
                let title = options
                    .title
                    .clone()
                    .unwrap_or_else(|| default_title(&branch));
                let body = options
                    .body
                    .clone()
                    .unwrap_or_else(|| default_body(&branch, &base));
                let request = CreatePullRequest {
                    title: &title,
                    body: Some(&body),
                    head: &branch,
                    base: &base,
                    draft: options.draft,
                };
                let pr = self.host.create_pull_request(self.slug, request).await?;
                (pr, SubmitAction::Created)
            }
        };

        self.tree
            .attach_pull_request(&branch, pull_request.number, &pull_request.url)?;

        Ok(SubmitReport {
            branch,
            base,
            pull_request,
            action,
        })
    }
}

fn default_title(branch: &str) -> String {
    format!("[{}] Feature implementation", branch)
}

fn default_body(branch: &str, base: &str) -> String {
    format!(
        "## Changes\n\nThis PR contains changes from the `{}` branch.\n\n**Base branch:** {}",
        branch, base
    )
}
