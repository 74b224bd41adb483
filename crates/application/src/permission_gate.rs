use std::collections::BTreeSet;

use lectern_core::{AppError, AppResult};
use lectern_domain::{Permission, PermissionSet, UserSession};

/// Who is calling an operation and from where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    /// Resolved session, absent for anonymous callers.
    pub session: Option<UserSession>,
    /// Client IP address, when known.
    pub ip_address: Option<String>,
}

impl CallerContext {
    /// Creates a context for an anonymous caller.
    #[must_use]
    pub fn anonymous(ip_address: Option<String>) -> Self {
        Self {
            session: None,
            ip_address,
        }
    }

    /// Creates a context for an authenticated caller.
    #[must_use]
    pub fn authenticated(session: UserSession, ip_address: Option<String>) -> Self {
        Self {
            session: Some(session),
            ip_address,
        }
    }
}

/// Result of intersecting granted permissions with a disjunctive requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    /// Required permissions the caller holds.
    pub matched: BTreeSet<Permission>,
    /// At least one requirement is held.
    pub is_any_matched: bool,
    /// Every requirement is held.
    pub is_fully_matched: bool,
}

/// Permission check bound to the session it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatch<'a> {
    /// Session the check ran against.
    pub session: &'a UserSession,
    /// Required permissions the caller holds.
    pub matches: BTreeSet<Permission>,
    /// At least one requirement is held.
    pub is_matched: bool,
    /// Every requirement is held.
    pub is_fully_matched: bool,
}

impl PermissionMatch<'_> {
    /// Returns whether one specific requirement is held.
    #[must_use]
    pub fn holds(&self, permission: Permission) -> bool {
        self.matches.contains(&permission)
    }
}

/// Intersects a permission set with `required`. Never touches a store.
#[must_use]
pub fn check_permissions(permissions: &PermissionSet, required: &[Permission]) -> PermissionCheck {
    let matched = permissions.matching(required);
    let distinct_required: BTreeSet<Permission> = required.iter().copied().collect();

    PermissionCheck {
        is_any_matched: !matched.is_empty(),
        is_fully_matched: matched.len() == distinct_required.len(),
        matched,
    }
}

/// Matches a caller session against `required`.
///
/// Returns `None` when there is no session; that is not an error.
#[must_use]
pub fn match_permissions<'a>(
    session: Option<&'a UserSession>,
    required: &[Permission],
) -> Option<PermissionMatch<'a>> {
    let session = session?;
    let check = check_permissions(session.permissions(), required);
    tracing::debug!(
        user_id = session.user_id(),
        required = required.len(),
        matched = check.matched.len(),
        "permission gate evaluated"
    );

    Some(PermissionMatch {
        session,
        matches: check.matched,
        is_matched: check.is_any_matched,
        is_fully_matched: check.is_fully_matched,
    })
}

/// Fails with `Unauthorized` unless the caller holds one of `required`.
pub fn require_any_permission<'a>(
    session: Option<&'a UserSession>,
    required: &[Permission],
    denial_message: &str,
) -> AppResult<PermissionMatch<'a>> {
    match match_permissions(session, required) {
        Some(permission_match) if permission_match.is_matched => Ok(permission_match),
        _ => Err(AppError::Unauthorized(denial_message.to_owned())),
    }
}

/// Read access for operations that also serve anonymous callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadAccess<'a> {
    /// Session, absent for anonymous callers.
    pub session: Option<&'a UserSession>,
    /// Read permissions in effect.
    pub matches: BTreeSet<Permission>,
}

impl ReadAccess<'_> {
    /// Returns whether one specific permission is in effect.
    #[must_use]
    pub fn holds(&self, permission: Permission) -> bool {
        self.matches.contains(&permission)
    }

    /// Returns the caller id when authenticated.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.session.map(UserSession::user_id)
    }
}

/// Matches a possibly anonymous caller, degrading to `public` without a session.
///
/// An authenticated caller holding none of `required` is `Unauthorized`.
pub fn match_or_public<'a>(
    session: Option<&'a UserSession>,
    required: &[Permission],
    public: &[Permission],
    denial_message: &str,
) -> AppResult<ReadAccess<'a>> {
    match match_permissions(session, required) {
        None => Ok(ReadAccess {
            session: None,
            matches: public
                .iter()
                .copied()
                .filter(|permission| required.contains(permission))
                .collect(),
        }),
        Some(permission_match) if permission_match.is_matched => Ok(ReadAccess {
            session: Some(permission_match.session),
            matches: permission_match.matches,
        }),
        Some(_) => Err(AppError::Unauthorized(denial_message.to_owned())),
    }
}
