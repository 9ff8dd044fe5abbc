//! Domain layer: identities, message records and addressing rules.

pub mod events;
pub mod identity;
pub mod message;
pub mod target;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
