//! Use case layer: dispatch, receive and session workflows.

pub mod attribution;
pub mod bootstrap;
pub mod context;
pub mod contracts;
pub mod dispatch;
pub mod receive;
pub mod session;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
