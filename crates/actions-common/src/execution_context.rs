// ExecutionContext: typed access to the facts GitHub provides to a step
// through environment variables, plus the webhook event payload.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use actions_sdk::{ActionError, JsonUtil, PayloadError, StringUtil};
use once_cell::unsync::OnceCell;
use serde_json::Value;

use crate::constants::{defaults, variables};

/// Environment of a single action invocation.
///
/// The variable map is captured once and never changes. The event payload is
/// read on first access and cached for the lifetime of the context, so a
/// context must not be reused for more than one invocation. Not thread safe.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    env: HashMap<String, String>,
    event_payload: OnceCell<Value>,
}

impl ExecutionContext {
    /// Create a context over the given variables.
    pub fn new(env: HashMap<String, String>) -> Self {
        Self {
            env,
            event_payload: OnceCell::new(),
        }
    }

    /// Create a context over the variables of the current process.
    pub fn from_process_env() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Create a context over raw OS variables.
    ///
    /// Names and values that are not valid UTF-8 are converted lossily, with
    /// U+FFFD replacing the invalid bytes.
    pub fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        Self::new(
            vars.into_iter()
                .map(|(name, value)| {
                    (
                        name.to_string_lossy().into_owned(),
                        value.to_string_lossy().into_owned(),
                    )
                })
                .collect(),
        )
    }

    fn mandatory(&self, name: &str) -> Result<&str, ActionError> {
        match self.env.get(name) {
            Some(value) => Ok(value),
            None => {
                tracing::debug!("Mandatory variable {} is not set", name);
                Err(ActionError::MissingVariable {
                    name: name.to_string(),
                })
            }
        }
    }

    fn optional(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    fn path_or(&self, name: &str, default: &str) -> PathBuf {
        PathBuf::from(self.optional(name).unwrap_or(default))
    }

    /// Home directory used to store user data, e.g. `/github/home`.
    pub fn home(&self) -> PathBuf {
        self.path_or(variables::HOME, defaults::HOME)
    }

    /// The name of the workflow.
    pub fn workflow(&self) -> Result<&str, ActionError> {
        self.mandatory(variables::WORKFLOW)
    }

    /// A unique number for each run within a repository.
    ///
    /// Does not change when the workflow run is re-run.
    pub fn run_id(&self) -> Result<&str, ActionError> {
        self.mandatory(variables::RUN_ID)
    }

    /// A unique number for each run of a particular workflow in a repository.
    ///
    /// Starts at 1 for the first run and increments with each new run.
    /// Defaults to 1 when unset.
    pub fn run_number(&self) -> Result<i64, ActionError> {
        match self.optional(variables::RUN_NUMBER) {
            None => Ok(defaults::RUN_NUMBER),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ActionError::InvalidVariable {
                    name: variables::RUN_NUMBER.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    /// The unique identifier of the action.
    pub fn action(&self) -> Result<&str, ActionError> {
        self.mandatory(variables::ACTION)
    }

    /// Whether the step runs under GitHub Actions rather than locally.
    pub fn actions(&self) -> bool {
        self.optional(variables::ACTIONS)
            .map_or(false, StringUtil::is_true)
    }

    /// The person or app that initiated the workflow, e.g. `octocat`.
    pub fn actor(&self) -> Result<&str, ActionError> {
        self.mandatory(variables::ACTOR)
    }

    /// Owner and repository name, e.g. `octocat/Hello-World`.
    pub fn repository(&self) -> Result<&str, ActionError> {
        self.mandatory(variables::REPOSITORY)
    }

    /// The name of the webhook event that triggered the workflow.
    pub fn event_name(&self) -> Result<&str, ActionError> {
        self.mandatory(variables::EVENT_NAME)
    }

    /// Path of the file holding the complete webhook event payload.
    pub fn event_path(&self) -> PathBuf {
        self.path_or(variables::EVENT_PATH, defaults::EVENT_PATH)
    }

    /// The workspace directory, holding the repository checkout if any.
    pub fn workspace(&self) -> PathBuf {
        self.path_or(variables::WORKSPACE, defaults::WORKSPACE)
    }

    /// The commit SHA that triggered the workflow.
    pub fn sha(&self) -> Option<&str> {
        self.optional(variables::SHA)
    }

    /// The branch or tag ref that triggered the workflow, e.g.
    /// `refs/heads/feature-branch-1`. Unset for events without one.
    pub fn git_ref(&self) -> Option<&str> {
        self.optional(variables::REF)
    }

    /// Branch of the head repository. Only set for forked repositories.
    pub fn head_ref(&self) -> Option<&str> {
        self.optional(variables::HEAD_REF)
    }

    /// Branch of the base repository. Only set for forked repositories.
    pub fn base_ref(&self) -> Option<&str> {
        self.optional(variables::BASE_REF)
    }

    /// URL of the GitHub server, e.g. `https://github.com`.
    pub fn server_url(&self) -> Result<&str, ActionError> {
        self.mandatory(variables::SERVER_URL)
    }

    /// REST API URL, e.g. `https://api.github.com`.
    pub fn api_url(&self) -> Result<&str, ActionError> {
        self.mandatory(variables::API_URL)
    }

    /// GraphQL API URL, e.g. `https://api.github.com/graphql`.
    pub fn graphql_url(&self) -> Result<&str, ActionError> {
        self.mandatory(variables::GRAPHQL_URL)
    }

    /// The `GITHUB_TOKEN` installation access token.
    pub fn secret_token(&self) -> Result<&str, ActionError> {
        self.mandatory(variables::TOKEN)
    }

    /// The parsed webhook event payload.
    ///
    /// Read from [`ExecutionContext::event_path`] on first call; later calls
    /// return the cached value without touching the file again.
    pub fn event_payload(&self) -> Result<&Value, ActionError> {
        self.event_payload.get_or_try_init(|| {
            let path = self.event_path();
            tracing::debug!("Reading event payload from {}", path.display());
            let parsed = fs::read_to_string(&path)
                .map_err(PayloadError::from)
                .and_then(|text| serde_json::from_str(&text).map_err(PayloadError::from));
            parsed.map_err(|source| ActionError::Payload { path, source })
        })
    }

    /// Look up a slash-separated path in the event payload.
    ///
    /// Missing and empty values are both `None`; see [`JsonUtil::find`].
    pub fn event_payload_find(&self, path: &str) -> Result<Option<&Value>, ActionError> {
        Ok(JsonUtil::find(self.event_payload()?, path))
    }

    /// Raw value of any environment variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.optional(name)
    }

    /// Value of the action input `name` as declared in the action metadata.
    ///
    /// `who-to-greet` is read from `INPUT_WHO-TO-GREET`, `my input` from
    /// `INPUT_MY_INPUT`.
    pub fn get_input(&self, name: &str) -> Option<&str> {
        self.optional(&Self::input_variable(name))
    }

    /// The environment variable carrying input `name`.
    pub fn input_variable(name: &str) -> String {
        format!(
            "{}{}",
            variables::INPUT_PREFIX,
            name.to_uppercase().replace(' ', "_")
        )
    }
}
