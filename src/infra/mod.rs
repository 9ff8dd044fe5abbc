//! Infrastructure layer: configuration, logging and startup errors.

pub mod config;
pub mod error;
pub mod logging;

/// Returns the infra module name for smoke checks.
pub fn module_name() -> &'static str {
    "infra"
}
