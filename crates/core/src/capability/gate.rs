//! The capability gate itself: pure authorization decisions, no side
//! effects.

use std::sync::Arc;

use super::roles::{CapabilityProvider, Identity};

/// Reason for an authorization denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Identity lacks the upload-files capability.
    CannotCreate,
    /// Identity lacks edit capability on the target resource.
    CannotEdit,
    /// Identity lacks delete capability on the target resource.
    CannotDelete,
}

/// Authorization gate over an injected capability provider.
#[derive(Clone)]
pub struct CapabilityGate {
    provider: Arc<dyn CapabilityProvider>,
}

impl CapabilityGate {
    /// Creates a gate over the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn CapabilityProvider>) -> Self {
        Self { provider }
    }

    /// Access the underlying provider.
    #[must_use]
    pub fn provider(&self) -> &dyn CapabilityProvider {
        self.provider.as_ref()
    }

    /// Authorizes creating a new attachment (without a target parent).
    pub fn authorize_upload(&self, identity: &Identity) -> Result<(), Denial> {
        if self.provider.can_upload(identity) {
            Ok(())
        } else {
            Err(Denial::CannotCreate)
        }
    }

    /// Authorizes attaching to (or otherwise editing) a parent resource
    /// owned by `owner_id`.
    pub fn authorize_parent_edit(&self, identity: &Identity, owner_id: i64) -> Result<(), Denial> {
        if self.provider.can_edit(identity, owner_id) {
            Ok(())
        } else {
            Err(Denial::CannotEdit)
        }
    }

    /// Authorizes editing an attachment owned by `owner_id`.
    pub fn authorize_edit(&self, identity: &Identity, owner_id: i64) -> Result<(), Denial> {
        if self.provider.can_edit(identity, owner_id) {
            Ok(())
        } else {
            Err(Denial::CannotEdit)
        }
    }

    /// Authorizes deleting an attachment owned by `owner_id`.
    pub fn authorize_delete(&self, identity: &Identity, owner_id: i64) -> Result<(), Denial> {
        if self.provider.can_delete(identity, owner_id) {
            Ok(())
        } else {
            Err(Denial::CannotDelete)
        }
    }
}

impl std::fmt::Debug for CapabilityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityGate").finish_non_exhaustive()
    }
}
