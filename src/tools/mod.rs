/// Tools Module
///
/// Each tool lives in its own module and exports a `register` function that
/// adds it to the registry during server startup.

pub mod calc;
pub mod echo;
pub mod time;

use crate::core::dispatch::ToolRegistry;

/// Build the registry of all tools exposed by this server.
///
/// Called once per transport at startup; the returned registry is never
/// mutated afterwards. Add new tool registrations here.
pub fn build_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    echo::register(&mut registry);
    time::register(&mut registry);
    calc::register(&mut registry);
    registry
}
