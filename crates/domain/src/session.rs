use std::collections::BTreeSet;

use lectern_core::UserIdentity;
use serde::{Deserialize, Serialize};

use crate::{MemberRef, Permission, PermissionSet};

/// Authenticated caller with its effective permissions.
///
/// Derived on every session read and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    identity: UserIdentity,
    roles: BTreeSet<String>,
    permissions: PermissionSet,
}

impl UserSession {
    /// Creates a session from a resolved identity.
    #[must_use]
    pub fn new(identity: UserIdentity, roles: BTreeSet<String>, permissions: PermissionSet) -> Self {
        Self {
            identity,
            roles,
            permissions,
        }
    }

    /// Returns the underlying identity.
    #[must_use]
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// Returns the caller's account id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.identity.id()
    }

    /// Returns the caller's email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.identity.email()
    }

    /// Returns the deduplicated role names, operator override applied.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Returns the effective permission set.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns whether the caller holds one permission.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns the minimal record stored in content membership lists.
    #[must_use]
    pub fn member_ref(&self) -> MemberRef {
        MemberRef {
            id: self.identity.id().to_owned(),
            email: self.identity.email().to_owned(),
            name: self.identity.display_name().map(ToOwned::to_owned),
            image: self.identity.image().map(ToOwned::to_owned),
        }
    }
}
