// Entrypoint: resolves the requested action, runs it and turns the outcome
// into the process exit code.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use actions_common::{Action, ActionBase, ExecutionContext, GitHubApiError};
use actions_sdk::{ActionError, CommandChannel};
use futures::FutureExt;
use thiserror::Error;

use crate::registry::ActionRegistry;

/// Why no action could be created.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no action name given")]
    MissingActionName,

    #[error("no action registered under '{0}'")]
    UnknownAction(String),

    #[error(transparent)]
    Construction(anyhow::Error),
}

/// A panic caught while building or running an action.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ActionPanic(String);

impl ActionPanic {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with a non-string payload".to_string()
        };
        ActionPanic(message)
    }
}

/// How a single entrypoint invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded,
    /// The action could not be found or created.
    ResolveFailed,
    /// The action ran and failed.
    RunFailed,
}

impl DispatchOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            DispatchOutcome::Succeeded => 0,
            DispatchOutcome::ResolveFailed => 1,
            DispatchOutcome::RunFailed => 2,
        }
    }
}

/// Resolve `action_name` in `registry`, run it with `args` and report
/// failures on `commands`.
pub async fn dispatch(
    registry: &ActionRegistry,
    action_name: Option<&str>,
    args: &[String],
    context: ExecutionContext,
    commands: CommandChannel,
) -> DispatchOutcome {
    let action = match resolve(registry, action_name, context, &commands) {
        Ok(action) => action,
        Err(err) => {
            commands.error(
                &format!(
                    "Cannot instantiate action '{}' because of {}: {:#}",
                    action_name.unwrap_or_default(),
                    resolve_error_type(&err),
                    err
                ),
                None,
            );
            return DispatchOutcome::ResolveFailed;
        }
    };

    let result = match AssertUnwindSafe(action.run(args)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(ActionPanic::from_payload(payload).into()),
    };

    match result {
        Ok(()) => DispatchOutcome::Succeeded,
        Err(err) => {
            tracing::debug!("Action failed: {:?}", err);
            let message = if err.downcast_ref::<ActionError>().is_some() {
                format!("Exiting with error code because of action error: {err:#}")
            } else {
                format!(
                    "Unexpected error when running action: {}: {:#}",
                    error_type(&err),
                    err
                )
            };
            commands.error(&message, None);
            DispatchOutcome::RunFailed
        }
    }
}

fn resolve(
    registry: &ActionRegistry,
    action_name: Option<&str>,
    context: ExecutionContext,
    commands: &CommandChannel,
) -> Result<Box<dyn Action>, ResolveError> {
    let name = action_name.ok_or(ResolveError::MissingActionName)?;
    commands.debug(&format!("Loading action {name}"));

    let constructor = registry
        .resolve(name)
        .ok_or_else(|| ResolveError::UnknownAction(name.to_string()))?;
    let base = ActionBase::new(Rc::new(context), commands.clone());
    let action = panic::catch_unwind(AssertUnwindSafe(|| constructor(base)))
        .unwrap_or_else(|payload| Err(ActionPanic::from_payload(payload).into()))
        .map_err(ResolveError::Construction)?;

    commands.debug("Action loaded successfully");
    Ok(action)
}

fn resolve_error_type(err: &ResolveError) -> String {
    match err {
        ResolveError::MissingActionName => "MissingActionName".to_string(),
        ResolveError::UnknownAction(_) => "UnknownAction".to_string(),
        ResolveError::Construction(inner) => error_type(inner),
    }
}

/// Short label for the concrete type behind `err`.
fn error_type(err: &anyhow::Error) -> String {
    if let Some(err) = err.downcast_ref::<ActionError>() {
        err.kind().to_string()
    } else if err.downcast_ref::<ActionPanic>().is_some() {
        "Panic".to_string()
    } else if err.downcast_ref::<GitHubApiError>().is_some() {
        "GitHubApiError".to_string()
    } else if err.downcast_ref::<reqwest::Error>().is_some() {
        "HttpError".to_string()
    } else if err.downcast_ref::<std::io::Error>().is_some() {
        "IoError".to_string()
    } else if err.downcast_ref::<serde_json::Error>().is_some() {
        "JsonError".to_string()
    } else {
        "Error".to_string()
    }
}
