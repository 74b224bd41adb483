//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod content;
mod role;
mod security;
mod session;
mod user;

pub use content::{
    ContentDocument, ContentFilter, ContentKind, ContentUpdate, Counter, MemberList, MemberRef,
};
pub use role::{
    BuiltinRole, DEFAULT_ROLE_NAME, OPERATOR_ROLE_NAME, Role, RoleKind, RoleStatus,
};
pub use security::{Permission, PermissionSet};
pub use session::UserSession;
pub use user::{
    EmailAddress, ProfilePatch, SavedContentRef, UserAccount, UserStatus, normalize_roles,
};
