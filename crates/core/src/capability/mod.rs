//! Capability gate: decides whether an identity may create, edit or
//! delete a resource.
//!
//! The rule set lives behind the [`CapabilityProvider`] trait so the
//! surrounding system (or a test) can substitute its own permission
//! model. [`RoleCapabilities`] implements the default role-based rules.

mod gate;
mod roles;

pub use gate::{CapabilityGate, Denial};
pub use roles::{CapabilityProvider, Identity, Role, RoleCapabilities};
