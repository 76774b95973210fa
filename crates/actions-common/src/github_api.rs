// GitHubApi: the slice of the GitHub REST API actions rely on, and its
// reqwest-backed implementation.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::constants::{defaults, variables};
use crate::execution_context::ExecutionContext;
use crate::http_client_factory::HttpClientFactory;

/// Characters escaped in an owner or repository path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A pull request as returned by `GET /repos/{owner}/{repo}/pulls/{number}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,

    #[serde(default)]
    pub title: String,

    /// `open` or `closed`.
    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub html_url: String,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub merged: bool,

    /// Author of the pull request.
    #[serde(default)]
    pub user: Option<Account>,

    #[serde(default)]
    pub head: Option<BranchRef>,

    #[serde(default)]
    pub base: Option<BranchRef>,
}

/// A user or organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

/// One side of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub git_ref: String,

    pub sha: String,

    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Error)]
pub enum GitHubApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid API URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub API returned HTTP {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },
}

/// Remote repository-hosting operations used by actions.
#[async_trait(?Send)]
pub trait GitHubApi {
    /// Fetch the pull request `number` of `owner/repo`.
    async fn pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest>;
}

/// REST client authenticated with a bearer token.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client for the API rooted at `api_url`.
    ///
    /// No request is made here; authentication problems surface on the first call.
    pub fn new(api_url: &str, token: &str) -> Result<Self, GitHubApiError> {
        let parsed = Url::parse(api_url).map_err(|source| GitHubApiError::InvalidUrl {
            url: api_url.to_string(),
            source,
        })?;
        let client = HttpClientFactory::create_client().map_err(GitHubApiError::Client)?;

        Ok(Self {
            client,
            api_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Create a client from the step environment.
    ///
    /// Requires `GITHUB_TOKEN`. Uses `GITHUB_API_URL` when set, the public
    /// API otherwise.
    pub fn from_context(context: &ExecutionContext) -> Result<Self> {
        let token = context.secret_token()?;
        let api_url = context
            .get(variables::API_URL)
            .unwrap_or(defaults::API_URL);
        tracing::debug!("Creating GitHub API client for {}", api_url);
        Ok(Self::new(api_url, token)?)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn pull_request_url(&self, owner: &str, repo: &str, number: u64) -> String {
        format!(
            "{base}/repos/{owner}/{repo}/pulls/{number}",
            base = self.api_url,
            owner = utf8_percent_encode(owner, PATH_SEGMENT),
            repo = utf8_percent_encode(repo, PATH_SEGMENT),
        )
    }
}

#[async_trait(?Send)]
impl GitHubApi for GitHubClient {
    async fn pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        let url = self.pull_request_url(owner, repo, number);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|source| GitHubApiError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubApiError::Status {
                status: status.as_u16(),
                url,
                body,
            }
            .into());
        }

        let pull_request = response
            .json::<PullRequest>()
            .await
            .map_err(|source| GitHubApiError::Request { url, source })?;
        Ok(pull_request)
    }
}

/// A `GitHubApi` answering from memory and recording every request.
/// Useful for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingGitHubApi {
    requests: Rc<RefCell<Vec<(String, String, u64)>>>,
    response: PullRequest,
}

impl RecordingGitHubApi {
    /// Answer every request with `response`.
    pub fn new(response: PullRequest) -> Self {
        Self {
            requests: Rc::default(),
            response,
        }
    }

    /// `(owner, repo, number)` of every request so far, shared between clones.
    pub fn requests(&self) -> Vec<(String, String, u64)> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl GitHubApi for RecordingGitHubApi {
    async fn pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        self.requests
            .borrow_mut()
            .push((owner.to_string(), repo.to_string(), number));
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client_factory::GITHUB_MEDIA_TYPE;
    use std::collections::HashMap;

    const PULL_REQUEST_JSON: &str = r#"{
        "number": 1,
        "title": "Add feature",
        "state": "open",
        "html_url": "https://github.com/alogin/repo_name/pull/1",
        "body": null,
        "draft": false,
        "user": {"login": "octocat", "id": 1},
        "head": {"ref": "feature", "sha": "abc123", "label": "alogin:feature"},
        "base": {"ref": "main", "sha": "def456", "label": "alogin:main"},
        "comments": 3
    }"#;

    #[tokio::test]
    async fn fetches_pull_request_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/alogin/repo_name/pulls/1")
            .match_header("authorization", "Bearer TOKEN")
            .match_header("accept", GITHUB_MEDIA_TYPE)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PULL_REQUEST_JSON)
            .create_async()
            .await;

        let client = GitHubClient::new(&server.url(), "TOKEN").unwrap();
        let pull_request = client.pull_request("alogin", "repo_name", 1).await.unwrap();

        mock.assert_async().await;
        assert_eq!(pull_request.number, 1);
        assert_eq!(pull_request.title, "Add feature");
        assert_eq!(pull_request.user.unwrap().login, "octocat");
        assert_eq!(pull_request.head.unwrap().git_ref, "feature");
        assert_eq!(pull_request.body, None);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/alogin/repo_name/pulls/404")
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let client = GitHubClient::new(&server.url(), "TOKEN").unwrap();
        let err = client
            .pull_request("alogin", "repo_name", 404)
            .await
            .unwrap_err();

        match err.downcast_ref::<GitHubApiError>() {
            Some(GitHubApiError::Status { status, body, .. }) => {
                assert_eq!(*status, 404);
                assert!(body.contains("Not Found"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn pull_request_url_escapes_segments() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/", "TOKEN").unwrap();
        assert_eq!(client.api_url(), "https://ghe.example.com/api/v3");
        assert_eq!(
            client.pull_request_url("my-org", "repo.rs", 7),
            "https://ghe.example.com/api/v3/repos/my-org/repo.rs/pulls/7"
        );
        assert_eq!(
            client.pull_request_url("a b", "c/d", 1),
            "https://ghe.example.com/api/v3/repos/a%20b/c%2Fd/pulls/1"
        );
    }

    #[test]
    fn invalid_api_url() {
        assert!(matches!(
            GitHubClient::new("not a url", "TOKEN"),
            Err(GitHubApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn from_context_requires_token() {
        let context = ExecutionContext::new(HashMap::new());
        let err = GitHubClient::from_context(&context).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<actions_sdk::ActionError>(),
            Some(actions_sdk::ActionError::MissingVariable { name }) if name == "GITHUB_TOKEN"
        ));
    }

    #[test]
    fn from_context_uses_api_url() {
        let mut env = HashMap::new();
        env.insert("GITHUB_TOKEN".to_string(), "TOKEN".to_string());
        let client = GitHubClient::from_context(&ExecutionContext::new(env.clone())).unwrap();
        assert_eq!(client.api_url(), "https://api.github.com");

        env.insert(
            "GITHUB_API_URL".to_string(),
            "https://ghe.example.com/api/v3".to_string(),
        );
        let client = GitHubClient::from_context(&ExecutionContext::new(env)).unwrap();
        assert_eq!(client.api_url(), "https://ghe.example.com/api/v3");
    }

    #[tokio::test]
    async fn recording_api_shares_requests_between_clones() {
        let api = RecordingGitHubApi::new(PullRequest {
            number: 9,
            ..Default::default()
        });
        let clone = api.clone();
        let pull_request = clone.pull_request("o", "r", 9).await.unwrap();
        assert_eq!(pull_request.number, 9);
        assert_eq!(api.requests(), vec![("o".to_string(), "r".to_string(), 9)]);
    }
}
