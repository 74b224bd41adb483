mod auth;
mod common;
mod content;
mod roles;
mod users;

pub use auth::{BootstrapRequest, SessionResponse};
pub use common::{HealthResponse, SearchQuery};
pub use content::{
    ContentPageResponse, ContentResponse, MemberResponse, RevalidateQuery, TopContentQuery,
};
pub use roles::{CreateRoleRequest, PermissionResponse, RoleResponse, UpdateRoleStatusRequest};
pub use users::{
    SavedContentResponse, UpdateProfileRequest, UserFilterQuery, UserPageResponse, UserResponse,
};
