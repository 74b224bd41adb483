use lectern_application::PermissionDescriptor;
use lectern_domain::Role;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for custom role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rank: i32,
    pub permissions: Vec<String>,
}

/// Incoming payload for activating or deactivating a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-role-status-request.ts"
)]
pub struct UpdateRoleStatusRequest {
    pub status: String,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub description: String,
    pub rank: i32,
    pub status: String,
    pub permissions: Vec<String>,
    pub created_by: String,
    pub updated_by: String,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.id,
            name: value.name,
            description: value.description,
            rank: value.rank,
            status: value.status.as_str().to_owned(),
            permissions: value
                .permissions
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
            created_by: value.created_by,
            updated_by: value.updated_by,
        }
    }
}

/// Catalog entry for a single permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<PermissionDescriptor> for PermissionResponse {
    fn from(value: PermissionDescriptor) -> Self {
        Self {
            id: value.permission.as_str().to_owned(),
            name: value.name.to_owned(),
            description: value.description.to_owned(),
        }
    }
}
