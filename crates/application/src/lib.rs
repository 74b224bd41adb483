//! Application services and ports.

#![forbid(unsafe_code)]

mod content_ports;
mod content_service;
mod engagement_service;
mod permission_gate;
mod revalidation_port;
mod role_ports;
mod role_service;
mod session_resolver;
mod user_ports;
mod user_service;

#[cfg(test)]
mod test_support;

pub use content_ports::{
    ContentOrder, ContentPage, ContentRepository, ContentSearchQuery, TopContentQuery,
};
pub use content_service::{ContentService, MAX_PAGE_SIZE};
pub use engagement_service::EngagementService;
pub use permission_gate::{
    CallerContext, PermissionCheck, PermissionMatch, ReadAccess, check_permissions,
    match_or_public, match_permissions, require_any_permission,
};
pub use revalidation_port::PathRevalidator;
pub use role_ports::{CreateRoleInput, RoleRepository};
pub use role_service::{PermissionDescriptor, RoleService};
pub use session_resolver::{OperatorAllowList, SessionResolver};
pub use user_ports::{RegisterIdentityInput, UserFilter, UserPage, UserRepository};
pub use user_service::UserService;
