// Error taxonomy shared by the framework and the actions built on it.

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of an [`ActionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A mandatory environment fact is missing or malformed.
    Configuration,
    /// The event payload file could not be read or parsed.
    Payload,
    /// An expected failure raised by action logic.
    Action,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "ConfigurationError"),
            ErrorKind::Payload => write!(f, "PayloadError"),
            ErrorKind::Action => write!(f, "ActionError"),
        }
    }
}

/// The domain error of the framework.
///
/// Every failure the framework knows how to name is an `ActionError`. The
/// entrypoint reports these as action errors; anything else is unexpected.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Missing environment variable value for {name}")]
    MissingVariable { name: String },

    #[error("Incorrect environment variable {name} value '{value}'")]
    InvalidVariable { name: String, value: String },

    #[error("Cannot get event payload data from '{}'", .path.display())]
    Payload {
        path: PathBuf,
        #[source]
        source: PayloadError,
    },

    #[error("{0}")]
    Failed(String),
}

/// Why the event payload could not be obtained.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("cannot read file")]
    Read(#[from] std::io::Error),

    #[error("invalid JSON")]
    Parse(#[from] serde_json::Error),
}

impl ActionError {
    /// Create a domain failure with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        ActionError::Failed(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::MissingVariable { .. } | ActionError::InvalidVariable { .. } => {
                ErrorKind::Configuration
            }
            ActionError::Payload { .. } => ErrorKind::Payload,
            ActionError::Failed(_) => ErrorKind::Action,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
