// Well-known names shared by the framework: environment variables set by the
// GitHub Actions runner, event names and API defaults.

/// Environment variables provided to every step.
///
/// See https://docs.github.com/en/actions/reference/environment-variables
pub mod variables {
    pub const HOME: &str = "HOME";
    pub const WORKFLOW: &str = "GITHUB_WORKFLOW";
    pub const RUN_ID: &str = "GITHUB_RUN_ID";
    pub const RUN_NUMBER: &str = "GITHUB_RUN_NUMBER";
    pub const ACTION: &str = "GITHUB_ACTION";
    pub const ACTIONS: &str = "GITHUB_ACTIONS";
    pub const ACTOR: &str = "GITHUB_ACTOR";
    pub const REPOSITORY: &str = "GITHUB_REPOSITORY";
    pub const EVENT_NAME: &str = "GITHUB_EVENT_NAME";
    pub const EVENT_PATH: &str = "GITHUB_EVENT_PATH";
    pub const WORKSPACE: &str = "GITHUB_WORKSPACE";
    pub const SHA: &str = "GITHUB_SHA";
    pub const REF: &str = "GITHUB_REF";
    pub const HEAD_REF: &str = "GITHUB_HEAD_REF";
    pub const BASE_REF: &str = "GITHUB_BASE_REF";
    pub const SERVER_URL: &str = "GITHUB_SERVER_URL";
    pub const API_URL: &str = "GITHUB_API_URL";
    pub const GRAPHQL_URL: &str = "GITHUB_GRAPHQL_URL";
    pub const TOKEN: &str = "GITHUB_TOKEN";

    /// Prefix of the variables carrying action inputs.
    pub const INPUT_PREFIX: &str = "INPUT_";
}

/// Defaults applied when a path-valued variable is unset.
pub mod defaults {
    pub const HOME: &str = ".";
    pub const EVENT_PATH: &str = "event.json";
    pub const WORKSPACE: &str = ".";
    pub const RUN_NUMBER: i64 = 1;
    pub const API_URL: &str = "https://api.github.com";
}

/// Webhook event names.
pub mod events {
    pub const PULL_REQUEST: &str = "pull_request";
}

/// Payload paths used to identify the pull request of a `pull_request` event.
pub mod payload_paths {
    pub const OWNER_LOGIN: &str = "repository/owner/login";
    pub const REPOSITORY_NAME: &str = "repository/name";
    pub const PULL_REQUEST_NUMBER: &str = "pull_request/number";
}
