use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use lectern_application::{ContentPage, ContentRepository, ContentSearchQuery, TopContentQuery};
use lectern_core::{AppError, AppResult};
use lectern_domain::{ContentDocument, ContentFilter, ContentKind, ContentUpdate};
use tokio::sync::RwLock;

/// In-memory content repository with single-document atomic updates.
#[derive(Debug, Default)]
pub struct InMemoryContentRepository {
    documents: RwLock<HashMap<String, ContentDocument>>,
    mutations: AtomicUsize,
}

impl InMemoryContentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document, replacing any previous version with the same id.
    ///
    /// Fails with a conflict when another document of the same kind already
    /// uses the slug.
    pub async fn insert_document(&self, document: ContentDocument) -> AppResult<()> {
        let mut documents = self.documents.write().await;
        if documents.values().any(|existing| {
            existing.id != document.id
                && existing.kind == document.kind
                && existing.slug == document.slug
        }) {
            return Err(AppError::Conflict(format!(
                "{} slug '{}' is already taken",
                document.kind.as_str(),
                document.slug
            )));
        }

        documents.insert(document.id.clone(), document);
        Ok(())
    }

    /// Number of successful conditional updates applied so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn find_content_by_id(&self, content_id: &str) -> AppResult<Option<ContentDocument>> {
        Ok(self.documents.read().await.get(content_id).cloned())
    }

    async fn find_content_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> AppResult<Option<ContentDocument>> {
        Ok(self
            .documents
            .read()
            .await
            .values()
            .find(|document| document.kind == kind && document.slug == slug)
            .cloned())
    }

    async fn list_content_by_author(
        &self,
        kind: ContentKind,
        author_id: &str,
        include_drafts: bool,
    ) -> AppResult<Vec<ContentDocument>> {
        let documents = self.documents.read().await;

        let mut values: Vec<ContentDocument> = documents
            .values()
            .filter(|document| {
                document.kind == kind
                    && document.is_authored_by(author_id)
                    && (include_drafts || document.is_published)
            })
            .cloned()
            .collect();
        values.sort_by(|left, right| right.created_at.cmp(&left.created_at));

        Ok(values)
    }

    async fn list_top_content(&self, query: TopContentQuery) -> AppResult<ContentPage> {
        let documents = self.documents.read().await;

        let mut values: Vec<&ContentDocument> = documents
            .values()
            .filter(|document| document.kind == query.kind && document.is_published)
            .collect();
        values.sort_by(|left, right| {
            query
                .order_by
                .counter_value(right)
                .cmp(&query.order_by.counter_value(left))
                .then_with(|| right.created_at.cmp(&left.created_at))
        });

        Ok(ContentPage {
            total: values.len() as u64,
            items: values
                .into_iter()
                .skip(query.skip)
                .take(query.limit)
                .cloned()
                .collect(),
        })
    }

    async fn search_content(&self, query: ContentSearchQuery) -> AppResult<ContentPage> {
        let documents = self.documents.read().await;

        let mut values: Vec<&ContentDocument> = documents
            .values()
            .filter(|document| {
                document.kind == query.kind
                    && (query.include_drafts || document.is_published)
                    && document.matches_text(&query.text)
            })
            .collect();
        values.sort_by(|left, right| right.created_at.cmp(&left.created_at));

        Ok(ContentPage {
            total: values.len() as u64,
            items: values
                .into_iter()
                .skip(query.skip)
                .take(query.limit)
                .cloned()
                .collect(),
        })
    }

    async fn find_one_and_update(
        &self,
        filter: ContentFilter,
        update: ContentUpdate,
    ) -> AppResult<Option<ContentDocument>> {
        let mut documents = self.documents.write().await;
        let Some(document) = documents.get_mut(filter.content_id()) else {
            return Ok(None);
        };

        if !filter.matches(document) {
            return Ok(None);
        }

        update.apply(document, Utc::now());
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(Some(document.clone()))
    }
}
