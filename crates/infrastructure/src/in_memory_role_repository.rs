use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use lectern_application::RoleRepository;
use lectern_core::{AppError, AppResult};
use lectern_domain::{Role, RoleStatus};
use tokio::sync::RwLock;

/// In-memory role store keyed by role id.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    roles: RwLock<HashMap<String, Role>>,
}

impl InMemoryRoleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_active_roles_by_names(&self, names: &[String]) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .values()
            .filter(|role| role.is_active() && names.contains(&role.name))
            .cloned()
            .collect())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut values: Vec<Role> = self.roles.read().await.values().cloned().collect();
        values.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(values)
    }

    async fn find_role_by_id(&self, role_id: &str) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(role_id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .values()
            .find(|role| role.name == name)
            .cloned())
    }

    async fn create_role(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.write().await;
        if roles
            .values()
            .any(|existing| existing.id == role.id || existing.name == role.name)
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name
            )));
        }

        roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    async fn update_role_status(
        &self,
        role_id: &str,
        status: RoleStatus,
        updated_by: &str,
    ) -> AppResult<Option<Role>> {
        let mut roles = self.roles.write().await;
        let Some(role) = roles.get_mut(role_id) else {
            return Ok(None);
        };

        role.status = status;
        role.updated_by = updated_by.to_owned();
        role.updated_at = Utc::now();
        Ok(Some(role.clone()))
    }
}
