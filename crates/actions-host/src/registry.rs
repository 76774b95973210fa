// ActionRegistry: maps action names given on the command line to the code
// constructing them.

use std::collections::BTreeMap;

use actions_common::{Action, ActionBase};
use actions_plugins::HelloWorldAction;
use anyhow::Result;

/// Builds an action from its shared state. Construction may fail, e.g. when
/// an action validates its inputs up front.
pub type ActionConstructor = fn(ActionBase) -> Result<Box<dyn Action>>;

/// Known actions, keyed by registered name.
#[derive(Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, ActionConstructor>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the actions bundled with this binary.
    pub fn with_builtin_actions() -> Self {
        let mut registry = Self::new();
        registry.register(HelloWorldAction::NAME, HelloWorldAction::create);
        registry
    }

    /// Register `constructor` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, constructor: ActionConstructor) {
        self.actions.insert(name.into(), constructor);
    }

    /// Find the constructor for `name`.
    ///
    /// `name` is either a registered name or the last segment of one, so
    /// `actions_plugins::HelloWorldAction` can also be requested as
    /// `HelloWorldAction`. A registered name always wins over a short one;
    /// among short-name matches the first in name order is taken.
    pub fn resolve(&self, name: &str) -> Option<ActionConstructor> {
        let name = name.trim();
        if let Some(constructor) = self.actions.get(name) {
            return Some(*constructor);
        }
        self.actions
            .iter()
            .find(|(registered, _)| short_name(registered) == name)
            .map(|(_, constructor)| *constructor)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Last `::` or `.` separated segment of a registered name.
fn short_name(name: &str) -> &str {
    let name = name.rsplit("::").next().unwrap_or(name);
    name.rsplit('.').next().unwrap_or(name)
}
