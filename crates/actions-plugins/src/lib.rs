// actions-plugins: Actions bundled with the entrypoint.
// Each action only uses the public contract of `actions-common`.

pub mod hello_world;

// Re-exports for convenient access
pub use hello_world::HelloWorldAction;
