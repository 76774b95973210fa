// actions-host: Runs one registered action per process.
//
// `main.rs` holds only argument parsing and logging setup; dispatching and
// the action registry live here so they can be tested in-process.

pub mod entrypoint;
pub mod registry;

pub use entrypoint::{dispatch, ActionPanic, DispatchOutcome, ResolveError};
pub use registry::{ActionConstructor, ActionRegistry};
