// actions-common: Framework services shared by every action.
// Depends on `actions-sdk`; holds the step environment model, the `Action`
// contract and the GitHub REST client.

pub mod action;
pub mod constants;
pub mod execution_context;
pub mod github_api;
pub mod http_client_factory;

// ---------------------------------------------------------------------------
// Re-exports for convenient access
// ---------------------------------------------------------------------------

pub use action::{Action, ActionBase, ApiFactory};
pub use execution_context::ExecutionContext;
pub use github_api::{
    Account, BranchRef, GitHubApi, GitHubApiError, GitHubClient, PullRequest, RecordingGitHubApi,
};
pub use http_client_factory::HttpClientFactory;
