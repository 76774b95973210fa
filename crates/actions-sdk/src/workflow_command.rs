// WorkflowCommand: one line of the `::command key=val,key2=val2::data`
// protocol the CI orchestrator parses out of step output.

use std::fmt;

/// The delimiter used both as prefix and as separator of a command line.
pub const COMMAND_KEY: &str = "::";

/// Well-known command names.
pub mod commands {
    pub const SET_OUTPUT: &str = "set-output";
    pub const SET_ENV: &str = "set-env";
    pub const ADD_PATH: &str = "add-path";
    pub const ADD_MASK: &str = "add-mask";
    pub const DEBUG: &str = "debug";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
    pub const STOP_COMMANDS: &str = "stop-commands";
}

/// A single workflow command.
///
/// Properties keep their insertion order, which is the order they are
/// written in. Neither properties nor data are escaped: the line is emitted
/// exactly as built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowCommand {
    /// The command name (e.g. "error", "set-output", "add-mask").
    pub command: String,
    /// Ordered key-value properties attached to the command.
    pub properties: Vec<(String, String)>,
    /// The command data / body text.
    pub data: String,
}

impl WorkflowCommand {
    /// Create a new `WorkflowCommand` with the given command name and no data.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            properties: Vec::new(),
            data: String::new(),
        }
    }

    /// Append a property.
    pub fn property(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.properties.push((key.into(), value.to_string()));
        self
    }

    /// Set the command data.
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    /// The resume marker for a `stop-commands` token: `::<token>::`.
    pub fn resume(token: &str) -> Self {
        Self::new(token)
    }
}

impl fmt::Display for WorkflowCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{COMMAND_KEY}{}", self.command)?;
        for (i, (key, value)) in self.properties.iter().enumerate() {
            let sep = if i == 0 { ' ' } else { ',' };
            write!(f, "{sep}{key}={value}")?;
        }
        write!(f, "{COMMAND_KEY}{}", self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_command() {
        let cmd = WorkflowCommand::new(commands::ERROR).data("something went wrong");
        assert_eq!(cmd.to_string(), "::error::something went wrong");
    }

    #[test]
    fn command_with_properties_in_order() {
        let cmd = WorkflowCommand::new(commands::WARNING)
            .property("file", "app.js")
            .property("line", 10)
            .property("col", 4)
            .data("something wrong");
        assert_eq!(cmd.to_string(), "::warning file=app.js,line=10,col=4::something wrong");
    }

    #[test]
    fn single_property() {
        let cmd = WorkflowCommand::new(commands::SET_OUTPUT)
            .property("name", "time")
            .data("now");
        assert_eq!(cmd.to_string(), "::set-output name=time::now");
    }

    #[test]
    fn resume_marker() {
        assert_eq!(WorkflowCommand::resume("XXX").to_string(), "::XXX::");
    }

    #[test]
    fn data_is_not_escaped() {
        let cmd = WorkflowCommand::new(commands::ADD_MASK).data("a;b%c]d");
        assert_eq!(cmd.to_string(), "::add-mask::a;b%c]d");
    }
}
