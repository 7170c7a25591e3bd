//! Identity, roles and the default role-based capability rules.

use serde::{Deserialize, Serialize};

/// Role held by an acting identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control over all resources.
    Admin,
    /// May edit and delete any resource.
    Editor,
    /// May upload files and edit own resources.
    Author,
    /// May submit content but not upload files.
    Contributor,
    /// Read-only access.
    Subscriber,
}

impl Role {
    /// Convert to the wire/database string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Author => "author",
            Self::Contributor => "contributor",
            Self::Subscriber => "subscriber",
        }
    }

    /// Parse from the wire/database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "author" => Some(Self::Author),
            "contributor" => Some(Self::Contributor),
            "subscriber" => Some(Self::Subscriber),
            _ => None,
        }
    }
}

/// The authenticated identity acting on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// User identifier.
    pub user_id: i64,
    /// Role held by the user.
    pub role: Role,
}

impl Identity {
    /// Creates an identity.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Pure decision interface over identity + capability set.
///
/// Injected into the capability gate so tests and alternative permission
/// models can replace the default role rules.
pub trait CapabilityProvider: Send + Sync {
    /// Whether the identity may upload files at all.
    fn can_upload(&self, identity: &Identity) -> bool;

    /// Whether the identity may edit a resource owned by `owner_id`.
    fn can_edit(&self, identity: &Identity, owner_id: i64) -> bool;

    /// Whether the identity may delete a resource owned by `owner_id`.
    fn can_delete(&self, identity: &Identity, owner_id: i64) -> bool;
}

/// Default role-based capability rules.
///
/// Upload requires Author or better. Admins and editors edit anything;
/// authors edit only their own resources; contributors and subscribers
/// edit nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleCapabilities;

impl CapabilityProvider for RoleCapabilities {
    fn can_upload(&self, identity: &Identity) -> bool {
        matches!(identity.role, Role::Admin | Role::Editor | Role::Author)
    }

    fn can_edit(&self, identity: &Identity, owner_id: i64) -> bool {
        match identity.role {
            Role::Admin | Role::Editor => true,
            Role::Author => identity.user_id == owner_id,
            Role::Contributor | Role::Subscriber => false,
        }
    }

    fn can_delete(&self, identity: &Identity, owner_id: i64) -> bool {
        self.can_edit(identity, owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Admin, true)]
    #[case(Role::Editor, true)]
    #[case(Role::Author, true)]
    #[case(Role::Contributor, false)]
    #[case(Role::Subscriber, false)]
    fn upload_requires_author_or_better(#[case] role: Role, #[case] allowed: bool) {
        let identity = Identity::new(7, role);
        assert_eq!(RoleCapabilities.can_upload(&identity), allowed);
    }

    #[test]
    fn author_edits_own_resources_only() {
        let author = Identity::new(7, Role::Author);
        assert!(RoleCapabilities.can_edit(&author, 7));
        assert!(!RoleCapabilities.can_edit(&author, 8));
    }

    #[test]
    fn editor_edits_any_resource() {
        let editor = Identity::new(1, Role::Editor);
        assert!(RoleCapabilities.can_edit(&editor, 99));
        assert!(RoleCapabilities.can_delete(&editor, 99));
    }

    #[test]
    fn contributor_edits_nothing() {
        let contributor = Identity::new(5, Role::Contributor);
        assert!(!RoleCapabilities.can_edit(&contributor, 5));
        assert!(!RoleCapabilities.can_delete(&contributor, 5));
    }

    #[test]
    fn role_roundtrip() {
        for role in [
            Role::Admin,
            Role::Editor,
            Role::Author,
            Role::Contributor,
            Role::Subscriber,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }
}
