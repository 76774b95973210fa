// HttpClientFactory: builds the reqwest client used to talk to the GitHub API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

/// Media type requested from the REST API.
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Header pinning the REST API version.
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// REST API version requested.
pub const API_VERSION: &str = "2022-11-28";

/// Creates HTTP clients configured for the GitHub REST API.
pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Overall timeout of a single request.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(100);
    /// Timeout of the connection phase.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// The user agent sent with every request. GitHub rejects requests without one.
    pub fn user_agent() -> String {
        format!("github-action-template/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Create a client sending the GitHub media type and API version headers.
    ///
    /// Proxy settings are picked up by reqwest from `HTTPS_PROXY` and friends.
    pub fn create_client() -> Result<Client, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .connect_timeout(Self::CONNECT_TIMEOUT)
            .user_agent(Self::user_agent())
            .default_headers(headers)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_carries_version() {
        let agent = HttpClientFactory::user_agent();
        assert!(agent.starts_with("github-action-template/"));
        assert!(agent.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn client_builds() {
        assert!(HttpClientFactory::create_client().is_ok());
    }
}
