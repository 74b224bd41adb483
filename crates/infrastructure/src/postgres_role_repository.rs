//! PostgreSQL-backed role repository storing roles as JSONB documents.

use async_trait::async_trait;
use chrono::Utc;
use lectern_application::RoleRepository;
use lectern_core::{AppError, AppResult};
use lectern_domain::{Role, RoleStatus};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// PostgreSQL implementation of the role repository port.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    document: Json<Role>,
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_active_roles_by_names(&self, names: &[String]) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT document
            FROM role_documents
            WHERE name = ANY($1) AND document ->> 'status' = 'active'
            "#,
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find active roles: {error}")))?;

        Ok(rows.into_iter().map(|row| row.document.0).collect())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT document
            FROM role_documents
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        Ok(rows.into_iter().map(|row| row.document.0).collect())
    }

    async fn find_role_by_id(&self, role_id: &str) -> AppResult<Option<Role>> {
        let Ok(role_id) = Uuid::parse_str(role_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT document
            FROM role_documents
            WHERE id = $1
            "#,
        )
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role by id: {error}")))?;

        Ok(row.map(|row| row.document.0))
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT document
            FROM role_documents
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role by name: {error}")))?;

        Ok(row.map(|row| row.document.0))
    }

    async fn create_role(&self, role: Role) -> AppResult<Role> {
        let role_id = Uuid::parse_str(role.id.as_str()).map_err(|error| {
            AppError::Validation(format!("invalid role id '{}': {error}", role.id))
        })?;

        let result = sqlx::query(
            r#"
            INSERT INTO role_documents (id, name, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(role_id)
        .bind(role.name.as_str())
        .bind(Json(&role))
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(role),
            Err(error) => {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23505")
                {
                    return Err(AppError::Conflict(format!(
                        "role '{}' already exists",
                        role.name
                    )));
                }

                Err(AppError::Internal(format!("failed to create role: {error}")))
            }
        }
    }

    async fn update_role_status(
        &self,
        role_id: &str,
        status: RoleStatus,
        updated_by: &str,
    ) -> AppResult<Option<Role>> {
        let Ok(role_id) = Uuid::parse_str(role_id) else {
            return Ok(None);
        };

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start role status transaction: {error}"))
        })?;

        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT document
            FROM role_documents
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(role_id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role document: {error}")))?;

        let Some(RoleRow {
            document: Json(mut role),
        }) = row
        else {
            return Ok(None);
        };

        role.status = status;
        role.updated_by = updated_by.to_owned();
        role.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE role_documents
            SET document = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(role_id)
        .bind(Json(&role))
        .bind(role.updated_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role status: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit role status update: {error}"))
        })?;

        Ok(Some(role))
    }
}
