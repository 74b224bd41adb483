use std::sync::Arc;

use chrono::Utc;
use lectern_core::{AppError, AppResult, NonEmptyString};
use lectern_domain::{BuiltinRole, Permission, Role, RoleStatus, UserSession};
use uuid::Uuid;

use crate::{CreateRoleInput, RoleRepository, require_any_permission};

/// Catalog entry returned to administration screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionDescriptor {
    /// Catalog permission.
    pub permission: Permission,
    /// Human readable name.
    pub name: &'static str,
    /// One-line explanation.
    pub description: &'static str,
}

/// Role and permission catalog administration.
#[derive(Clone)]
pub struct RoleService {
    role_repository: Arc<dyn RoleRepository>,
}

impl RoleService {
    /// Creates a new role administration service.
    #[must_use]
    pub fn new(role_repository: Arc<dyn RoleRepository>) -> Self {
        Self { role_repository }
    }

    /// Lists built-in roles followed by stored roles.
    pub async fn list_roles(&self, actor: &UserSession) -> AppResult<Vec<Role>> {
        require_role_view(actor)?;

        let mut roles: Vec<Role> = BuiltinRole::all().iter().map(BuiltinRole::to_role).collect();
        roles.extend(self.role_repository.list_roles().await?);
        Ok(roles)
    }

    /// Returns one stored role by id.
    pub async fn role_by_id(&self, actor: &UserSession, role_id: &str) -> AppResult<Role> {
        require_role_view(actor)?;

        self.role_repository
            .find_role_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    /// Returns a role by name, falling back to a built-in role.
    pub async fn role_by_name(&self, actor: &UserSession, name: &str) -> AppResult<Role> {
        require_role_view(actor)?;

        if let Some(role) = self.role_repository.find_role_by_name(name).await? {
            return Ok(role);
        }

        BuiltinRole::from_name(name)
            .map(|builtin| builtin.to_role())
            .ok_or_else(|| AppError::NotFound(format!("role '{name}' does not exist")))
    }

    /// Creates a stored role.
    pub async fn create_role(&self, actor: &UserSession, input: CreateRoleInput) -> AppResult<Role> {
        require_any_permission(
            Some(actor),
            &[Permission::RoleAdd],
            "You don't have the permission to add roles",
        )?;

        let role = Role::new(
            Uuid::new_v4().to_string(),
            NonEmptyString::new(input.name)?,
            input.description,
            input.rank,
            input.permissions.into_iter().collect(),
            actor.user_id(),
            Utc::now(),
        )?;

        if self
            .role_repository
            .find_role_by_name(role.name.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name
            )));
        }

        let created = self.role_repository.create_role(role).await?;
        tracing::info!(role = %created.name, actor = actor.user_id(), "role created");
        Ok(created)
    }

    /// Activates or deactivates a stored role.
    pub async fn set_role_status(
        &self,
        actor: &UserSession,
        role_id: &str,
        status: RoleStatus,
    ) -> AppResult<Role> {
        require_any_permission(
            Some(actor),
            &[Permission::RoleEdit],
            "You don't have the permission to edit roles",
        )?;

        self.role_repository
            .update_role_status(role_id, status, actor.user_id())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    /// Returns the permission catalog with names and descriptions.
    pub fn permission_catalog(&self, actor: &UserSession) -> AppResult<Vec<PermissionDescriptor>> {
        require_any_permission(
            Some(actor),
            &[Permission::PermissionView],
            "You don't have the permission to view permissions",
        )?;

        Ok(Permission::all()
            .iter()
            .map(|permission| PermissionDescriptor {
                permission: *permission,
                name: permission.display_name(),
                description: permission.description(),
            })
            .collect())
    }
}

fn require_role_view(actor: &UserSession) -> AppResult<()> {
    require_any_permission(
        Some(actor),
        &[Permission::RoleView],
        "You don't have the permission to view roles",
    )
    .map(|_| ())
}
