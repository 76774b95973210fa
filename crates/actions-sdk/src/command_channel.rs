// CommandChannel: emits workflow commands on standard output.
//
// Every call writes complete lines and flushes, so the orchestrator watching
// the log stream sees commands in the order they were issued, interleaved
// correctly with plain log text written through the same channel.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use crate::string_util::{StringUtil, DEFAULT_TOKEN_LENGTH};
use crate::workflow_command::{commands, WorkflowCommand};

/// Where a warning or error occurred. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl FileLocation {
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            file: file.into(),
            line,
            col,
        }
    }
}

/// Writer of the workflow-command protocol.
///
/// Clones share the same sink. The channel is meant for a single thread
/// running a single action.
#[derive(Clone)]
pub struct CommandChannel {
    sink: Rc<RefCell<Box<dyn Write>>>,
}

impl fmt::Debug for CommandChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandChannel").finish_non_exhaustive()
    }
}

impl CommandChannel {
    /// A channel writing to the process standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// A channel writing to an arbitrary sink.
    pub fn new(sink: impl Write + 'static) -> Self {
        Self {
            sink: Rc::new(RefCell::new(Box::new(sink))),
        }
    }

    /// A channel writing into memory, plus a handle to read what was written.
    pub fn capture() -> (Self, CapturedOutput) {
        let output = CapturedOutput::default();
        (Self::new(output.clone()), output)
    }

    /// Write one line of plain log text.
    ///
    /// Output failures cannot be reported through the channel itself; they
    /// are traced and the line is lost.
    pub fn write_line(&self, line: &str) {
        let mut sink = self.sink.borrow_mut();
        let result = writeln!(sink, "{line}").and_then(|()| sink.flush());
        if let Err(e) = result {
            tracing::warn!("Failed to write workflow output: {}", e);
        }
    }

    fn emit(&self, command: &WorkflowCommand) {
        self.write_line(&command.to_string());
    }

    /// Set an output parameter of the current step.
    pub fn set_output(&self, name: &str, value: &str) {
        self.emit(
            &WorkflowCommand::new(commands::SET_OUTPUT)
                .property("name", name)
                .data(value),
        );
    }

    /// Create or update an environment variable for the steps that run next.
    ///
    /// The current step does not see the new value.
    pub fn set_env(&self, name: &str, value: &str) {
        self.emit(
            &WorkflowCommand::new(commands::SET_ENV)
                .property("name", name)
                .data(value),
        );
    }

    /// Prepend a directory to `PATH` for the steps that run next.
    pub fn add_path(&self, path: &Path) {
        self.emit(&WorkflowCommand::new(commands::ADD_PATH).data(path.display().to_string()));
    }

    /// Debug message, one command per line of `message`.
    ///
    /// Only visible when step debug logging is enabled on the repository.
    pub fn debug(&self, message: &str) {
        for line in StringUtil::split_lines(message) {
            self.emit(&WorkflowCommand::new(commands::DEBUG).data(line));
        }
    }

    /// Warning message.
    ///
    /// Without a location, one command is written per line of `message`.
    /// With a location the message is flattened onto a single command.
    pub fn warning(&self, message: &str, location: Option<&FileLocation>) {
        self.annotate(commands::WARNING, message, location);
    }

    /// Error message. Same line handling as [`CommandChannel::warning`].
    pub fn error(&self, message: &str, location: Option<&FileLocation>) {
        self.annotate(commands::ERROR, message, location);
    }

    fn annotate(&self, command: &str, message: &str, location: Option<&FileLocation>) {
        match location {
            Some(location) => self.emit(
                &WorkflowCommand::new(command)
                    .property("file", &location.file)
                    .property("line", location.line)
                    .property("col", location.col)
                    .data(StringUtil::newlines_to_spaces(message)),
            ),
            None => {
                for line in StringUtil::split_lines(message) {
                    self.emit(&WorkflowCommand::new(command).data(line));
                }
            }
        }
    }

    /// Mask a value in all log output that follows.
    pub fn add_mask(&self, value: &str) {
        self.emit(&WorkflowCommand::new(commands::ADD_MASK).data(value));
    }

    /// Stop interpreting workflow commands until `token` is echoed back.
    pub fn stop_commands(&self, token: &str) {
        self.emit(&WorkflowCommand::new(commands::STOP_COMMANDS).data(token));
    }

    /// Resume interpreting workflow commands stopped with `token`.
    pub fn start_commands(&self, token: &str) {
        self.emit(&WorkflowCommand::resume(token));
    }

    /// Stop command processing until the returned guard is dropped.
    ///
    /// Uses `token` when given and not empty, otherwise a fresh random one.
    /// The resume line is written when the guard goes out of scope, including
    /// early returns and panics.
    pub fn suspend_commands(&self, token: Option<&str>) -> CommandsSuspended {
        let token = match token.filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None => StringUtil::random_str(DEFAULT_TOKEN_LENGTH),
        };
        self.stop_commands(&token);
        CommandsSuspended {
            channel: self.clone(),
            token,
        }
    }

    /// Run `f` with workflow commands disabled.
    ///
    /// Anything `f` writes to stdout is shown as-is instead of being parsed.
    pub fn without_commands<R>(&self, token: Option<&str>, f: impl FnOnce() -> R) -> R {
        let _suspended = self.suspend_commands(token);
        f()
    }
}

/// Guard returned by [`CommandChannel::suspend_commands`].
#[must_use = "commands resume as soon as the guard is dropped"]
pub struct CommandsSuspended {
    channel: CommandChannel,
    token: String,
}

impl CommandsSuspended {
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Drop for CommandsSuspended {
    fn drop(&mut self) {
        self.channel.start_commands(&self.token);
    }
}

/// In-memory sink collecting everything written to a captured channel.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl CapturedOutput {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }

    /// Written lines, without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buffer.borrow_mut().clear();
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::path::PathBuf;

    fn lines_of(f: impl FnOnce(&CommandChannel)) -> Vec<String> {
        let (channel, output) = CommandChannel::capture();
        f(&channel);
        output.lines()
    }

    #[test]
    fn single_line_commands() {
        let cases: Vec<(Box<dyn Fn(&CommandChannel)>, &str)> = vec![
            (Box::new(|c: &CommandChannel| c.set_env("XXX", "YYY")), "::set-env name=XXX::YYY"),
            (Box::new(|c: &CommandChannel| c.set_output("XXX", "YYY")), "::set-output name=XXX::YYY"),
            (Box::new(|c: &CommandChannel| c.add_path(&PathBuf::from("XXX"))), "::add-path::XXX"),
            (Box::new(|c: &CommandChannel| c.debug("XXX")), "::debug::XXX"),
            (Box::new(|c: &CommandChannel| c.warning("XXX", None)), "::warning::XXX"),
            (
                Box::new(|c: &CommandChannel| c.warning("XXX", Some(&FileLocation::new("FILE", 3, 4)))),
                "::warning file=FILE,line=3,col=4::XXX",
            ),
            (Box::new(|c: &CommandChannel| c.error("XXX", None)), "::error::XXX"),
            (
                Box::new(|c: &CommandChannel| c.error("XXX", Some(&FileLocation::new("FILE", 3, 4)))),
                "::error file=FILE,line=3,col=4::XXX",
            ),
            (Box::new(|c: &CommandChannel| c.add_mask("XXX")), "::add-mask::XXX"),
            (Box::new(|c: &CommandChannel| c.stop_commands("XXX")), "::stop-commands::XXX"),
            (Box::new(|c: &CommandChannel| c.start_commands("XXX")), "::XXX::"),
        ];

        for (command, expected) in cases {
            assert_eq!(lines_of(|c| command(c)), vec![expected.to_string()]);
        }
    }

    #[test]
    fn multi_line_messages_without_location_split() {
        let message = "XXX\nYYY\nZZZ";
        assert_eq!(
            lines_of(|c| c.debug(message)),
            vec!["::debug::XXX", "::debug::YYY", "::debug::ZZZ"]
        );
        assert_eq!(
            lines_of(|c| c.warning(message, None)),
            vec!["::warning::XXX", "::warning::YYY", "::warning::ZZZ"]
        );
        assert_eq!(
            lines_of(|c| c.error(message, None)),
            vec!["::error::XXX", "::error::YYY", "::error::ZZZ"]
        );
    }

    #[test]
    fn carriage_returns_split_lines() {
        assert_eq!(
            lines_of(|c| c.debug("XXX\rYYY\r\nZZZ")),
            vec!["::debug::XXX", "::debug::YYY", "::debug::ZZZ"]
        );
        assert_eq!(
            lines_of(|c| c.error("XXX\rYYY", None)),
            vec!["::error::XXX", "::error::YYY"]
        );
    }

    #[test]
    fn multi_line_messages_with_location_flatten() {
        let location = FileLocation::new("FILE", 3, 4);
        assert_eq!(
            lines_of(|c| c.warning("XXX\nYYY\r\nZZZ", Some(&location))),
            vec!["::warning file=FILE,line=3,col=4::XXX YYY ZZZ"]
        );
        assert_eq!(
            lines_of(|c| c.error("XXX\nYYY\nZZZ", Some(&location))),
            vec!["::error file=FILE,line=3,col=4::XXX YYY ZZZ"]
        );
    }

    #[test]
    fn empty_debug_message_emits_nothing() {
        assert!(lines_of(|c| c.debug("")).is_empty());
    }

    #[test]
    fn plain_lines_interleave_in_order() {
        let lines = lines_of(|c| {
            c.debug("first");
            c.write_line("plain text");
            c.set_output("name", "value");
        });
        assert_eq!(
            lines,
            vec!["::debug::first", "plain text", "::set-output name=name::value"]
        );
    }

    #[test]
    fn without_commands_with_explicit_token() {
        let lines = lines_of(|c| {
            let value = c.without_commands(Some("TOKEN"), || {
                c.write_line("::not-a-command::");
                42
            });
            assert_eq!(value, 42);
        });
        assert_eq!(
            lines,
            vec!["::stop-commands::TOKEN", "::not-a-command::", "::TOKEN::"]
        );
    }

    #[test]
    fn without_commands_generates_fresh_tokens() {
        let (channel, output) = CommandChannel::capture();
        let first = channel.suspend_commands(None).token().to_string();
        let second = channel.suspend_commands(None).token().to_string();
        assert_eq!(first.len(), 20);
        assert!(first.chars().all(|c| c.is_ascii_alphabetic()));
        assert_ne!(first, second);
        assert_eq!(
            output.lines(),
            vec![
                format!("::stop-commands::{first}"),
                format!("::{first}::"),
                format!("::stop-commands::{second}"),
                format!("::{second}::"),
            ]
        );
    }

    #[test]
    fn empty_token_is_replaced() {
        let (channel, output) = CommandChannel::capture();
        channel.without_commands(Some(""), || channel.set_output("x", "y"));

        let lines = output.lines();
        let token = lines[0].strip_prefix("::stop-commands::").unwrap();
        assert_eq!(token.len(), 20);
        assert_eq!(lines[1], "::set-output name=x::y");
        assert_eq!(lines[2], format!("::{token}::"));
    }

    #[test]
    fn without_commands_resumes_on_error() {
        let lines = lines_of(|c| {
            let result: Result<(), String> =
                c.without_commands(Some("TOKEN"), || Err("failed".to_string()));
            assert!(result.is_err());
        });
        assert_eq!(lines, vec!["::stop-commands::TOKEN", "::TOKEN::"]);
    }

    #[test]
    fn without_commands_resumes_on_panic() {
        let (channel, output) = CommandChannel::capture();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            channel.without_commands(Some("TOKEN"), || panic!("boom"))
        }));
        assert!(result.is_err());
        assert_eq!(output.lines(), vec!["::stop-commands::TOKEN", "::TOKEN::"]);
    }

    #[test]
    fn clones_share_the_sink() {
        let (channel, output) = CommandChannel::capture();
        let other = channel.clone();
        channel.debug("one");
        other.debug("two");
        assert_eq!(output.lines(), vec!["::debug::one", "::debug::two"]);
        output.clear();
        assert!(output.contents().is_empty());
    }
}
