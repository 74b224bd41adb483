//! PostgreSQL-backed identity repository storing accounts as JSONB documents.

use async_trait::async_trait;
use chrono::Utc;
use lectern_application::{UserFilter, UserPage, UserRepository};
use lectern_core::{AppError, AppResult};
use lectern_domain::{ProfilePatch, SavedContentRef, UserAccount};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::postgres_paging::{contains_pattern, page_bounds};

mod saved_content;

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_account(
        transaction: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT document
            FROM identity_documents
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock identity document: {error}")))?;

        Ok(row.map(|row| row.document.0))
    }

    async fn write_account(
        transaction: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        account: &UserAccount,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE identity_documents
            SET document = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(Json(account))
        .bind(account.updated_at)
        .execute(&mut **transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to write identity document: {error}"))
        })?;

        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    document: Json<UserAccount>,
}

#[derive(Debug, FromRow)]
struct CountRow {
    total: i64,
}

fn user_page(rows: Vec<UserRow>, count: CountRow) -> UserPage {
    UserPage {
        items: rows.into_iter().map(|row| row.document.0).collect(),
        total: u64::try_from(count.total).unwrap_or_default(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user_by_id(&self, user_id: &str) -> AppResult<Option<UserAccount>> {
        let Ok(user_id) = Uuid::parse_str(user_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT document
            FROM identity_documents
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        Ok(row.map(|row| row.document.0))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT document
            FROM identity_documents
            WHERE email = LOWER($1)
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by email: {error}")))?;

        Ok(row.map(|row| row.document.0))
    }

    async fn list_users_by_role(&self, role: &str) -> AppResult<Vec<UserAccount>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT document
            FROM identity_documents
            WHERE document -> 'roles' @> jsonb_build_array($1::TEXT)
            ORDER BY email
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users by role: {error}")))?;

        Ok(rows.into_iter().map(|row| row.document.0).collect())
    }

    async fn search_users(&self, text: &str, limit: usize, skip: usize) -> AppResult<UserPage> {
        let (limit, skip) = page_bounds(limit, skip)?;
        let pattern = contains_pattern(text);

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT document
            FROM identity_documents
            WHERE document ->> 'name' ILIKE $1
               OR email ILIKE $1
               OR document ->> 'bio' ILIKE $1
            ORDER BY email
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern.as_str())
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to search users: {error}")))?;

        let count = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT COUNT(*) AS total
            FROM identity_documents
            WHERE document ->> 'name' ILIKE $1
               OR email ILIKE $1
               OR document ->> 'bio' ILIKE $1
            "#,
        )
        .bind(pattern.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count user matches: {error}"))
        })?;

        Ok(user_page(rows, count))
    }

    async fn filter_users(
        &self,
        filter: &UserFilter,
        limit: usize,
        skip: usize,
    ) -> AppResult<UserPage> {
        let (limit, skip) = page_bounds(limit, skip)?;
        let status = filter.status.map(|status| status.as_str());

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT document
            FROM identity_documents
            WHERE ($1::TEXT IS NULL OR document ->> 'status' = $1)
              AND ($2::TEXT IS NULL OR document -> 'roles' @> jsonb_build_array($2::TEXT))
              AND ($3::TEXT IS NULL OR email = LOWER($3))
            ORDER BY email
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(status)
        .bind(filter.role.as_deref())
        .bind(filter.email.as_deref())
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to filter users: {error}")))?;

        let count = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT COUNT(*) AS total
            FROM identity_documents
            WHERE ($1::TEXT IS NULL OR document ->> 'status' = $1)
              AND ($2::TEXT IS NULL OR document -> 'roles' @> jsonb_build_array($2::TEXT))
              AND ($3::TEXT IS NULL OR email = LOWER($3))
            "#,
        )
        .bind(status)
        .bind(filter.role.as_deref())
        .bind(filter.email.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count filtered users: {error}"))
        })?;

        Ok(user_page(rows, count))
    }

    async fn save_user(&self, account: UserAccount) -> AppResult<UserAccount> {
        let user_id = Uuid::parse_str(account.id.as_str()).map_err(|error| {
            AppError::Validation(format!("invalid user id '{}': {error}", account.id))
        })?;

        let result = sqlx::query(
            r#"
            INSERT INTO identity_documents (id, email, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(account.email.as_str())
        .bind(Json(&account))
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(account),
            Err(error) => {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23505")
                {
                    return Err(AppError::Conflict(format!(
                        "email '{}' is already registered",
                        account.email
                    )));
                }

                Err(AppError::Internal(format!("failed to save user: {error}")))
            }
        }
    }

    async fn update_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> AppResult<Option<UserAccount>> {
        let Ok(user_id) = Uuid::parse_str(user_id) else {
            return Ok(None);
        };

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start profile update transaction: {error}"))
        })?;

        let Some(mut account) = Self::lock_account(&mut transaction, user_id).await? else {
            return Ok(None);
        };
        account.apply_profile(&patch, Utc::now());
        Self::write_account(&mut transaction, user_id, &account).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit profile update: {error}"))
        })?;

        Ok(Some(account))
    }

    async fn add_saved_content(&self, user_id: &str, entry: SavedContentRef) -> AppResult<bool> {
        self.add_saved_content_impl(user_id, entry).await
    }

    async fn remove_saved_content(&self, user_id: &str, content_id: &str) -> AppResult<bool> {
        self.remove_saved_content_impl(user_id, content_id).await
    }
}
