//! UI layer: line-based chat console.

mod command_input;
mod message_rendering;
pub mod shell;

pub use message_rendering::ConsoleSink;

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
