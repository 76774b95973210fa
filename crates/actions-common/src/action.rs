// The contract every action implements, and the shared state actions build on.

use std::rc::Rc;

use actions_sdk::{ActionError, CommandChannel};
use anyhow::Result;
use async_trait::async_trait;
use once_cell::unsync::OnceCell;
use serde_json::Value;

use crate::constants::{events, payload_paths};
use crate::execution_context::ExecutionContext;
use crate::github_api::{GitHubApi, GitHubClient, PullRequest};

/// Builds the API client of an action on first use.
pub type ApiFactory = Box<dyn Fn(&ExecutionContext) -> Result<Box<dyn GitHubApi>>>;

/// A unit of CI automation run once per process.
///
/// Errors returned from `run` are not handled here; the entrypoint turns
/// them into a process exit code. Return an [`ActionError`] for failures the
/// action can name.
#[async_trait(?Send)]
pub trait Action {
    /// Perform the action with the command-line arguments left after the
    /// action name.
    async fn run(&self, args: &[String]) -> Result<()>;
}

fn default_api(context: &ExecutionContext) -> Result<Box<dyn GitHubApi>> {
    Ok(Box::new(GitHubClient::from_context(context)?))
}

/// State shared by all actions: the step environment, the command channel
/// and a lazily created GitHub API client.
///
/// The client is created at most once per instance. Like the context, an
/// `ActionBase` serves a single invocation on a single thread.
pub struct ActionBase {
    context: Rc<ExecutionContext>,
    commands: CommandChannel,
    api_factory: ApiFactory,
    github_api: OnceCell<Box<dyn GitHubApi>>,
}

impl ActionBase {
    pub fn new(context: Rc<ExecutionContext>, commands: CommandChannel) -> Self {
        Self {
            context,
            commands,
            api_factory: Box::new(default_api),
            github_api: OnceCell::new(),
        }
    }

    /// Replace the way the API client is created.
    pub fn with_api_factory(
        mut self,
        factory: impl Fn(&ExecutionContext) -> Result<Box<dyn GitHubApi>> + 'static,
    ) -> Self {
        self.api_factory = Box::new(factory);
        self
    }

    /// The step environment.
    pub fn env(&self) -> &ExecutionContext {
        &self.context
    }

    /// The workflow-command channel.
    pub fn commands(&self) -> &CommandChannel {
        &self.commands
    }

    /// Value of the action input `name`; see [`ExecutionContext::get_input`].
    pub fn get_input(&self, name: &str) -> Option<&str> {
        self.context.get_input(name)
    }

    /// The GitHub API client, created on first access with `GITHUB_TOKEN`.
    pub fn github_api(&self) -> Result<&dyn GitHubApi> {
        let api = self
            .github_api
            .get_or_try_init(|| (self.api_factory)(&self.context))?;
        Ok(api.as_ref())
    }

    /// Fetch the pull request that triggered this run.
    ///
    /// Fails with an [`ActionError`] unless the triggering event is
    /// `pull_request`. Owner, repository and number come from the event
    /// payload and are passed to the API as found.
    pub async fn get_pull_request_from_event(&self) -> Result<PullRequest> {
        if self.context.event_name()? != events::PULL_REQUEST {
            return Err(ActionError::failed(
                "Trying to get Pull Request data but event is not a Pull Request",
            )
            .into());
        }

        let owner = payload_str(&self.context, payload_paths::OWNER_LOGIN)?;
        let repo = payload_str(&self.context, payload_paths::REPOSITORY_NAME)?;
        let number = payload_number(&self.context, payload_paths::PULL_REQUEST_NUMBER)?;

        self.github_api()?.pull_request(&owner, &repo, number).await
    }
}

fn missing_payload_value(path: &str) -> ActionError {
    ActionError::failed(format!("Event payload has no usable value at '{path}'"))
}

fn payload_str(context: &ExecutionContext, path: &str) -> Result<String, ActionError> {
    match context.event_payload_find(path)? {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(missing_payload_value(path)),
    }
}

/// Pull request numbers are integers, but also accepted as numeric strings.
fn payload_number(context: &ExecutionContext, path: &str) -> Result<u64, ActionError> {
    match context.event_payload_find(path)? {
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| missing_payload_value(path)),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| missing_payload_value(path)),
        _ => Err(missing_payload_value(path)),
    }
}
