//! The remote code host that pull requests are opened against.

use crate::errors::StResult;
use async_trait::async_trait;
use octocrab::{params::State, Octocrab};
use std::fmt::Display;
use tracing::debug;

#[cfg(test)]
pub(crate) mod mock;

/// The `owner/name` pair identifying a remote repository.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RepoSlug {
    /// The owner of the repository.
    pub owner: String,
    /// The name of the repository.
    pub name: String,
}

impl RepoSlug {
    /// Creates a new [RepoSlug].
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The user a token authenticates as.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HostUser {
    /// The user's login.
    pub login: String,
}

/// A remote repository.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HostRepository {
    /// The full `owner/name` of the repository.
    pub full_name: String,
}

/// A pull request on the code host.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PullRequest {
    /// The pull request number.
    pub number: u64,
    /// The web URL of the pull request.
    pub url: String,
    /// The branch being merged.
    pub head: String,
    /// The branch being merged into.
    pub base: String,
    /// The title of the pull request.
    pub title: String,
    /// Whether the pull request is a draft.
    pub draft: bool,
}

/// The fields of a new pull request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CreatePullRequest<'a> {
    /// The title of the pull request.
    pub title: &'a str,
    /// The description, if any.
    pub body: Option<&'a str>,
    /// The branch being merged.
    pub head: &'a str,
    /// The branch being merged into.
    pub base: &'a str,
    /// Whether to open the pull request as a draft.
    pub draft: bool,
}

/// The fields to change on an existing pull request. [None] leaves a field as it is.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct UpdatePullRequest<'a> {
    /// The new title.
    pub title: Option<&'a str>,
    /// The new description.
    pub body: Option<&'a str>,
    /// The new branch to merge into.
    pub base: Option<&'a str>,
}

/// A remote code host. Each call is a single attempt; there are no retries.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Returns the user the client is authenticated as.
    async fn authenticated_user(&self) -> StResult<HostUser>;

    /// Returns the repository identified by `slug`.
    async fn repository(&self, slug: &RepoSlug) -> StResult<HostRepository>;

    /// Opens a new pull request.
    async fn create_pull_request(
        &self,
        slug: &RepoSlug,
        request: CreatePullRequest<'_>,
    ) -> StResult<PullRequest>;

    /// Returns pull request `number`.
    async fn get_pull_request(&self, slug: &RepoSlug, number: u64) -> StResult<PullRequest>;

    /// Lists open pull requests, optionally only those whose head is `head`.
    async fn list_pull_requests(
        &self,
        slug: &RepoSlug,
        head: Option<&str>,
    ) -> StResult<Vec<PullRequest>>;

    /// Updates pull request `number`.
    async fn update_pull_request(
        &self,
        slug: &RepoSlug,
        number: u64,
        update: UpdatePullRequest<'_>,
    ) -> StResult<PullRequest>;
}

/// A [CodeHost] backed by the GitHub REST API.
pub struct GitHubHost {
    client: Octocrab,
}

impl GitHubHost {
    /// Creates a new [GitHubHost] authenticating with a personal access token.
    pub fn new(token: &str) -> StResult<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()?;
        Ok(Self { client })
    }
}

impl From<octocrab::models::pulls::PullRequest> for PullRequest {
    fn from(pr: octocrab::models::pulls::PullRequest) -> Self {
        Self {
            number: pr.number,
            url: pr
                .html_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            head: pr.head.ref_field,
            base: pr.base.ref_field,
            title: pr.title.unwrap_or_default(),
            draft: pr.draft.unwrap_or(false),
        }
    }
}

#[async_trait]
impl CodeHost for GitHubHost {
    async fn authenticated_user(&self) -> StResult<HostUser> {
        let user = self.client.current().user().await?;
        debug!(login = %user.login, "authenticated");
        Ok(HostUser { login: user.login })
    }

    async fn repository(&self, slug: &RepoSlug) -> StResult<HostRepository> {
        let repository = self.client.repos(&slug.owner, &slug.name).get().await?;
        Ok(HostRepository {
            full_name: repository.full_name.unwrap_or_else(|| slug.to_string()),
        })
    }

    async fn create_pull_request(
        &self,
        slug: &RepoSlug,
        request: CreatePullRequest<'_>,
    ) -> StResult<PullRequest> {
        debug!(
            head = request.head,
            base = request.base,
            draft = request.draft,
            "creating pull request"
        );
        let pulls = self.client.pulls(&slug.owner, &slug.name);
        let mut builder = pulls
            .create(request.title, request.head, request.base)
            .draft(request.draft);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let pr = PullRequest::from(builder.send().await?);
        debug!(number = pr.number, "created pull request");
        Ok(pr)
    }

    async fn get_pull_request(&self, slug: &RepoSlug, number: u64) -> StResult<PullRequest> {
        let pr = self
            .client
            .pulls(&slug.owner, &slug.name)
            .get(number)
            .await?;
        Ok(pr.into())
    }

    async fn list_pull_requests(
        &self,
        slug: &RepoSlug,
        head: Option<&str>,
    ) -> StResult<Vec<PullRequest>> {
        let pulls = self.client.pulls(&slug.owner, &slug.name);
        let mut builder = pulls.list().state(State::Open);
        if let Some(head) = head {
            // GitHub filters heads as `owner:branch`.
            builder = builder.head(format!("{}:{}", slug.owner, head));
        }

        let page = builder.send().await?;
        Ok(page.items.into_iter().map(PullRequest::from).collect())
    }

    async fn update_pull_request(
        &self,
        slug: &RepoSlug,
        number: u64,
        update: UpdatePullRequest<'_>,
    ) -> StResult<PullRequest> {
        debug!(number, ?update, "updating pull request");
        let pulls = self.client.pulls(&slug.owner, &slug.name);
        let mut builder = pulls.update(number);
        if let Some(title) = update.title {
            builder = builder.title(title);
        }
        if let Some(body) = update.body {
            builder = builder.body(body);
        }
        if let Some(base) = update.base {
            builder = builder.base(base);
        }

        let pr = builder.send().await?;
        Ok(pr.into())
    }
}

#[cfg(test)]
mod test {
    use super::{mock::MockHost, CodeHost, RepoSlug};

    #[test]
    fn slug_display() {
        assert_eq!(RepoSlug::new("clabby", "stax").to_string(), "clabby/stax");
    }

    #[tokio::test]
    async fn rejected_token_is_a_code_host_error() {
        let host = MockHost::default();
        let err = host.authenticated_user().await.unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::CodeHost);

        let host = MockHost::new("clabby");
        assert_eq!(host.authenticated_user().await.unwrap().login, "clabby");
    }
}
