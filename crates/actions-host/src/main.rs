// action-entrypoint: runs one registered action inside a CI step.
//
// Usage:
//   action-entrypoint [--list] <action-name> [action-args...]
//
// Everything after the action name is handed to the action untouched.
// Stdout carries workflow commands; diagnostics go to stderr and are
// filtered with RUST_LOG.

use std::process::ExitCode;

use actions_common::ExecutionContext;
use actions_host::{dispatch, ActionRegistry, DispatchOutcome};
use actions_sdk::CommandChannel;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Command-line arguments of the entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "action-entrypoint",
    version,
    about = "Run a GitHub action registered in this binary"
)]
struct Cli {
    /// Print the registered action names and exit.
    #[arg(long)]
    list: bool,

    /// Registered name of the action, or its last segment.
    action: Option<String>,

    /// Arguments passed through to the action.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version are reported as errors by clap
            if !err.use_stderr() {
                return ExitCode::SUCCESS;
            }
            return ExitCode::from(DispatchOutcome::ResolveFailed.exit_code());
        }
    };

    let registry = ActionRegistry::with_builtin_actions();
    if cli.list {
        for name in registry.names() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!("Failed to build tokio runtime: {}", err);
            return ExitCode::from(DispatchOutcome::ResolveFailed.exit_code());
        }
    };

    let outcome = runtime.block_on(dispatch(
        &registry,
        cli.action.as_deref(),
        &cli.args,
        ExecutionContext::from_process_env(),
        CommandChannel::stdout(),
    ));
    tracing::debug!("Action finished with {:?}", outcome);

    ExitCode::from(outcome.exit_code())
}
