// actions-sdk: Foundation layer for writing GitHub actions.
// This crate has ZERO dependencies on other workspace crates and provides
// the payload lookup, the workflow-command protocol and the error taxonomy
// used throughout the framework.

pub mod command_channel;
pub mod error;
pub mod json_util;
pub mod string_util;
pub mod workflow_command;

// Re-export commonly used items at crate root
pub use command_channel::{CapturedOutput, CommandChannel, CommandsSuspended, FileLocation};
pub use error::{ActionError, ErrorKind, PayloadError};
pub use json_util::JsonUtil;
pub use string_util::StringUtil;
pub use workflow_command::WorkflowCommand;
