//! A scripted [CodeHost] for tests.

use super::{
    CodeHost, CreatePullRequest, HostRepository, HostUser, PullRequest, RepoSlug,
    UpdatePullRequest,
};
use crate::errors::{StError, StResult};
use async_trait::async_trait;
use std::sync::Mutex;

/// A [CodeHost] holding pull requests in memory.
#[derive(Debug, Default)]
pub(crate) struct MockHost {
    /// The login returned by [CodeHost::authenticated_user]. [None] rejects the token.
    pub(crate) login: Option<String>,
    /// Every pull request, open or created during the test.
    pub(crate) pull_requests: Mutex<Vec<PullRequest>>,
    /// Every mutating call made, formatted as `"<op> <args>"`.
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) fail_create: bool,
}

impl MockHost {
    /// Creates a host that authenticates as `login`.
    pub(crate) fn new(login: &str) -> Self {
        Self {
            login: Some(login.to_string()),
            ..Default::default()
        }
    }

    /// Seeds an open pull request from `head` into `base`.
    pub(crate) fn with_pull_request(self, number: u64, head: &str, base: &str) -> Self {
        self.pull_requests
            .lock()
            .unwrap()
            .push(Self::pull_request(number, head, base, "existing", false));
        self
    }

    /// Returns the recorded calls.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn pull_request(number: u64, head: &str, base: &str, title: &str, draft: bool) -> PullRequest {
        PullRequest {
            number,
            url: format!("https://github.com/clabby/stax/pull/{}", number),
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            draft,
        }
    }

    fn not_found(number: u64) -> StError {
        StError::CodeHost(format!("pull request #{} not found", number))
    }
}

#[async_trait]
impl CodeHost for MockHost {
    async fn authenticated_user(&self) -> StResult<HostUser> {
        self.login
            .clone()
            .map(|login| HostUser { login })
            .ok_or_else(|| StError::CodeHost("Bad credentials".to_string()))
    }

    async fn repository(&self, slug: &RepoSlug) -> StResult<HostRepository> {
        Ok(HostRepository {
            full_name: slug.to_string(),
        })
    }

    async fn create_pull_request(
        &self,
        _: &RepoSlug,
        request: CreatePullRequest<'_>,
    ) -> StResult<PullRequest> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create {} {}", request.head, request.base));
        if self.fail_create {
            return Err(StError::CodeHost("Validation Failed".to_string()));
        }

        let mut pull_requests = self.pull_requests.lock().unwrap();
        let number = pull_requests.iter().map(|pr| pr.number).max().unwrap_or(0) + 1;
        let pr = Self::pull_request(
            number,
            request.head,
            request.base,
            request.title,
            request.draft,
        );
        pull_requests.push(pr.clone());
        Ok(pr)
    }

    async fn get_pull_request(&self, _: &RepoSlug, number: u64) -> StResult<PullRequest> {
        self.pull_requests
            .lock()
            .unwrap()
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
            .ok_or_else(|| Self::not_found(number))
    }

    async fn list_pull_requests(
        &self,
        _: &RepoSlug,
        head: Option<&str>,
    ) -> StResult<Vec<PullRequest>> {
        Ok(self
            .pull_requests
            .lock()
            .unwrap()
            .iter()
            .filter(|pr| head.map_or(true, |h| pr.head == h))
            .cloned()
            .collect())
    }

    async fn update_pull_request(
        &self,
        _: &RepoSlug,
        number: u64,
        update: UpdatePullRequest<'_>,
    ) -> StResult<PullRequest> {
        self.calls.lock().unwrap().push(format!(
            "update {} {}",
            number,
            update.base.unwrap_or("-")
        ));

        let mut pull_requests = self.pull_requests.lock().unwrap();
        let pr = pull_requests
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or_else(|| Self::not_found(number))?;
        if let Some(title) = update.title {
            pr.title = title.to_string();
        }
        if let Some(base) = update.base {
            pr.base = base.to_string();
        }
        Ok(pr.clone())
    }
}
