use std::collections::BTreeSet;
use std::sync::Arc;

use lectern_core::UserIdentity;
use lectern_domain::{OPERATOR_ROLE_NAME, PermissionSet, RoleKind, UserSession};

use crate::RoleRepository;

/// Emails that always receive the operator role.
///
/// Matching is case-insensitive and cannot be revoked by stored roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorAllowList(BTreeSet<String>);

impl OperatorAllowList {
    /// Creates an allow-list from email values.
    #[must_use]
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            emails
                .into_iter()
                .map(|email| email.as_ref().trim().to_lowercase())
                .filter(|email| !email.is_empty())
                .collect(),
        )
    }

    /// Parses a comma-separated list such as `OPERATOR_EMAILS`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self::new(value.split(','))
    }

    /// Returns whether the email is allow-listed.
    #[must_use]
    pub fn contains(&self, email: &str) -> bool {
        self.0.contains(email.trim().to_lowercase().as_str())
    }

    /// Returns the number of allow-listed emails.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no email is allow-listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Computes the effective permissions of an identity.
#[derive(Clone)]
pub struct SessionResolver {
    role_repository: Arc<dyn RoleRepository>,
    operator_allow_list: OperatorAllowList,
}

impl SessionResolver {
    /// Creates a resolver over the role store and the operator allow-list.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        operator_allow_list: OperatorAllowList,
    ) -> Self {
        Self {
            role_repository,
            operator_allow_list,
        }
    }

    /// Returns the deduplicated role names with the operator override applied.
    #[must_use]
    pub fn effective_roles(&self, email: &str, roles: &[String]) -> BTreeSet<String> {
        let mut effective: BTreeSet<String> = roles
            .iter()
            .map(|role| role.trim())
            .filter(|role| !role.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if self.operator_allow_list.contains(email) {
            effective.insert(OPERATOR_ROLE_NAME.to_owned());
        }

        effective
    }

    /// Builds the session for an identity.
    ///
    /// A failing role store degrades the session to the `default-user` bundle.
    pub async fn resolve(&self, identity: UserIdentity) -> UserSession {
        let roles = self.effective_roles(identity.email(), identity.roles());
        let mut permissions = PermissionSet::default_user();

        let mut lookup = Vec::new();
        for kind in roles.iter().map(|name| RoleKind::from_name(name)) {
            match kind {
                RoleKind::Operator => {
                    tracing::debug!(user_id = identity.id(), "operator role grants full catalog");
                    return UserSession::new(identity, roles, PermissionSet::full());
                }
                RoleKind::Default => {}
                RoleKind::Named(name) => lookup.push(name),
            }
        }

        if !lookup.is_empty() {
            match self.role_repository.find_active_roles_by_names(&lookup).await {
                Ok(stored_roles) => {
                    for role in stored_roles.into_iter().filter(|role| role.is_active()) {
                        permissions.grant_all(role.permissions);
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        user_id = identity.id(),
                        %error,
                        "role store unavailable, session degraded to default permissions"
                    );
                }
            }
        }

        UserSession::new(identity, roles, permissions)
    }
}
