// HelloWorldAction: the sample action. Greets, reports the time as a step
// output and logs what it knows about the run.

use actions_common::constants::events;
use actions_common::{Action, ActionBase};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, SecondsFormat};

/// Input names read by this action.
mod input_names {
    pub const WHO_TO_GREET: &str = "who-to-greet";
}

/// Output names set by this action.
mod output_names {
    pub const TIME: &str = "time";
}

const DEFAULT_GREETEE: &str = "World";

const SEPARATOR: &str = "------------------------------------------------------------";

/// Action that logs its invocation details.
///
/// When triggered by a pull request it also fetches the pull request from
/// the API and prints it.
pub struct HelloWorldAction {
    base: ActionBase,
}

impl HelloWorldAction {
    /// Name the action is registered under.
    pub const NAME: &'static str = "actions_plugins::HelloWorldAction";

    pub fn new(base: ActionBase) -> Self {
        Self { base }
    }

    /// Registry constructor.
    pub fn create(base: ActionBase) -> Result<Box<dyn Action>> {
        Ok(Box::new(Self::new(base)))
    }
}

#[async_trait(?Send)]
impl Action for HelloWorldAction {
    async fn run(&self, args: &[String]) -> Result<()> {
        let commands = self.base.commands();
        let env = self.base.env();

        let who = self
            .base
            .get_input(input_names::WHO_TO_GREET)
            .unwrap_or(DEFAULT_GREETEE);
        let now = Local::now().to_rfc3339_opts(SecondsFormat::Micros, false);

        commands.without_commands(None, || {
            commands.write_line(&format!("Hello, {who}!"));
            commands.write_line(&format!("It is now {now}."));
            commands.write_line(SEPARATOR);
        });
        commands.set_output(output_names::TIME, &now);

        // Everything below only demonstrates the framework.
        let _suspended = commands.suspend_commands(None);
        commands.write_line(&format!(
            "I am {} started by {}.",
            env.action()?,
            env.actor()?
        ));
        commands.write_line(&format!(
            "I was run with args: {args:?} and here is my payload:"
        ));
        let payload = serde_json::to_string_pretty(env.event_payload()?)?;
        for line in payload.lines() {
            commands.write_line(line);
        }

        if env.event_name()? == events::PULL_REQUEST {
            let pull_request = self.base.get_pull_request_from_event().await?;
            tracing::debug!("Fetched pull request #{}", pull_request.number);
            commands.write_line(&format!(
                "Pull request was #{} {}:",
                pull_request.number, pull_request.title
            ));
            for line in serde_json::to_string_pretty(&pull_request)?.lines() {
                commands.write_line(line);
            }
        }

        Ok(())
    }
}
