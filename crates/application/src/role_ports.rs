use async_trait::async_trait;
use lectern_core::AppResult;
use lectern_domain::{Permission, Role, RoleStatus};

/// Input payload for creating stored roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Ordering hint.
    pub rank: i32,
    /// Grants to attach to the role.
    pub permissions: Vec<Permission>,
}

/// Repository port for persisted role records.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds active roles whose name is in `names`. Unknown names are skipped.
    async fn find_active_roles_by_names(&self, names: &[String]) -> AppResult<Vec<Role>>;

    /// Lists every stored role.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Finds one stored role by id.
    async fn find_role_by_id(&self, role_id: &str) -> AppResult<Option<Role>>;

    /// Finds one stored role by its unique name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Persists a new role. Fails with a conflict when the name is taken.
    async fn create_role(&self, role: Role) -> AppResult<Role>;

    /// Changes a role's status, returning the updated record.
    async fn update_role_status(
        &self,
        role_id: &str,
        status: RoleStatus,
        updated_by: &str,
    ) -> AppResult<Option<Role>>;
}
