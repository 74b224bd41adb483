//! PostgreSQL-backed content repository storing documents as JSONB.

use async_trait::async_trait;
use chrono::Utc;
use lectern_application::{
    ContentOrder, ContentPage, ContentRepository, ContentSearchQuery, TopContentQuery,
};
use lectern_core::{AppError, AppResult};
use lectern_domain::{ContentDocument, ContentFilter, ContentKind, ContentUpdate};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::postgres_paging::{contains_pattern, page_bounds};

/// PostgreSQL implementation of the content repository port.
#[derive(Clone)]
pub struct PostgresContentRepository {
    pool: PgPool,
}

impl PostgresContentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces a document.
    pub async fn insert_document(&self, document: &ContentDocument) -> AppResult<()> {
        let content_id = parse_document_id(document.id.as_str())?;

        let result = sqlx::query(
            r#"
            INSERT INTO content_documents (id, kind, slug, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET kind = EXCLUDED.kind,
                slug = EXCLUDED.slug,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(content_id)
        .bind(document.kind.as_str())
        .bind(document.slug.as_str())
        .bind(Json(document))
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) => {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23505")
                {
                    return Err(AppError::Conflict(format!(
                        "{} slug '{}' is already taken",
                        document.kind.as_str(),
                        document.slug
                    )));
                }

                Err(AppError::Internal(format!(
                    "failed to store content document: {error}"
                )))
            }
        }
    }
}

#[derive(Debug, FromRow)]
struct ContentRow {
    document: Json<ContentDocument>,
}

#[derive(Debug, FromRow)]
struct CountRow {
    total: i64,
}

fn parse_document_id(content_id: &str) -> AppResult<Uuid> {
    canonical_document_id(content_id).ok_or_else(|| {
        AppError::Validation(format!(
            "invalid content id '{content_id}': expected a lowercase hyphenated uuid"
        ))
    })
}

/// Accepts only the hyphenated lowercase form stored in `document.id`.
fn canonical_document_id(content_id: &str) -> Option<Uuid> {
    Uuid::parse_str(content_id)
        .ok()
        .filter(|parsed| parsed.hyphenated().to_string() == content_id)
}

fn order_expression(order_by: ContentOrder) -> &'static str {
    match order_by {
        ContentOrder::Views => "(document ->> 'views')::BIGINT",
        ContentOrder::Likes => "(document ->> 'likes')::BIGINT",
        ContentOrder::Saves => "(document ->> 'saves')::BIGINT",
    }
}

#[async_trait]
impl ContentRepository for PostgresContentRepository {
    async fn find_content_by_id(&self, content_id: &str) -> AppResult<Option<ContentDocument>> {
        let Some(content_id) = canonical_document_id(content_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT document
            FROM content_documents
            WHERE id = $1
            "#,
        )
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find content by id: {error}")))?;

        Ok(row.map(|row| row.document.0))
    }

    async fn find_content_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> AppResult<Option<ContentDocument>> {
        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT document
            FROM content_documents
            WHERE kind = $1 AND slug = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find content by slug: {error}")))?;

        Ok(row.map(|row| row.document.0))
    }

    async fn list_content_by_author(
        &self,
        kind: ContentKind,
        author_id: &str,
        include_drafts: bool,
    ) -> AppResult<Vec<ContentDocument>> {
        let rows = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT document
            FROM content_documents
            WHERE kind = $1
              AND document -> 'author' ->> 'id' = $2
              AND ($3 OR (document ->> 'is_published')::BOOLEAN)
            ORDER BY created_at DESC
            "#,
        )
        .bind(kind.as_str())
        .bind(author_id)
        .bind(include_drafts)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list content by author: {error}"))
        })?;

        Ok(rows.into_iter().map(|row| row.document.0).collect())
    }

    async fn list_top_content(&self, query: TopContentQuery) -> AppResult<ContentPage> {
        let (limit, skip) = page_bounds(query.limit, query.skip)?;

        let statement = format!(
            r#"
            SELECT document
            FROM content_documents
            WHERE kind = $1 AND (document ->> 'is_published')::BOOLEAN
            ORDER BY {} DESC, created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            order_expression(query.order_by)
        );
        let rows = sqlx::query_as::<_, ContentRow>(statement.as_str())
            .bind(query.kind.as_str())
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list top content: {error}")))?;

        let count = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT COUNT(*) AS total
            FROM content_documents
            WHERE kind = $1 AND (document ->> 'is_published')::BOOLEAN
            "#,
        )
        .bind(query.kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count top content: {error}")))?;

        Ok(ContentPage {
            items: rows.into_iter().map(|row| row.document.0).collect(),
            total: u64::try_from(count.total).unwrap_or_default(),
        })
    }

    async fn search_content(&self, query: ContentSearchQuery) -> AppResult<ContentPage> {
        let (limit, skip) = page_bounds(query.limit, query.skip)?;
        let pattern = contains_pattern(query.text.as_str());

        let rows = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT document
            FROM content_documents
            WHERE kind = $1
              AND ($2 OR (document ->> 'is_published')::BOOLEAN)
              AND (
                document ->> 'title' ILIKE $3
                OR document ->> 'excerpt' ILIKE $3
                OR document ->> 'body' ILIKE $3
                OR EXISTS (
                  SELECT 1
                  FROM jsonb_array_elements_text(document -> 'tags') AS tag
                  WHERE tag ILIKE $3
                )
              )
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.kind.as_str())
        .bind(query.include_drafts)
        .bind(pattern.as_str())
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to search content: {error}")))?;

        let count = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT COUNT(*) AS total
            FROM content_documents
            WHERE kind = $1
              AND ($2 OR (document ->> 'is_published')::BOOLEAN)
              AND (
                document ->> 'title' ILIKE $3
                OR document ->> 'excerpt' ILIKE $3
                OR document ->> 'body' ILIKE $3
                OR EXISTS (
                  SELECT 1
                  FROM jsonb_array_elements_text(document -> 'tags') AS tag
                  WHERE tag ILIKE $3
                )
              )
            "#,
        )
        .bind(query.kind.as_str())
        .bind(query.include_drafts)
        .bind(pattern.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count content matches: {error}"))
        })?;

        Ok(ContentPage {
            items: rows.into_iter().map(|row| row.document.0).collect(),
            total: u64::try_from(count.total).unwrap_or_default(),
        })
    }

    async fn find_one_and_update(
        &self,
        filter: ContentFilter,
        update: ContentUpdate,
    ) -> AppResult<Option<ContentDocument>> {
        let Some(content_id) = canonical_document_id(filter.content_id()) else {
            return Ok(None);
        };

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start content update transaction: {error}"))
        })?;

        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT document
            FROM content_documents
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(content_id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock content document: {error}")))?;

        let Some(ContentRow {
            document: Json(mut document),
        }) = row
        else {
            return Ok(None);
        };
        if !filter.matches(&document) {
            return Ok(None);
        }

        update.apply(&mut document, Utc::now());

        sqlx::query(
            r#"
            UPDATE content_documents
            SET document = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(content_id)
        .bind(Json(&document))
        .bind(document.updated_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to write content document: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit content update: {error}"))
        })?;

        Ok(Some(document))
    }
}

#[cfg(test)]
mod tests;
