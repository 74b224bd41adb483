use std::sync::Arc;

use lectern_core::{AppError, AppResult};
use lectern_domain::{ContentDocument, ContentKind, UserSession};

use crate::{
    ContentOrder, ContentPage, ContentRepository, ContentSearchQuery, ReadAccess,
    TopContentQuery, match_or_public,
};

/// Largest page served by paged listings and searches.
pub const MAX_PAGE_SIZE: usize = 100;

/// Permission-gated content reads.
#[derive(Clone)]
pub struct ContentService {
    content_repository: Arc<dyn ContentRepository>,
}

impl ContentService {
    /// Creates a new content read service.
    #[must_use]
    pub fn new(content_repository: Arc<dyn ContentRepository>) -> Self {
        Self { content_repository }
    }

    /// Returns one document by id.
    ///
    /// Drafts are reported as missing unless the caller wrote them or may view drafts.
    pub async fn content_by_id(
        &self,
        kind: ContentKind,
        content_id: &str,
        session: Option<&UserSession>,
    ) -> AppResult<ContentDocument> {
        let access = read_access(kind, session)?;
        let document = self
            .content_repository
            .find_content_by_id(content_id)
            .await?
            .filter(|document| document.kind == kind);

        visible_or_not_found(kind, document, &access)
    }

    /// Returns one document by slug, with the same draft rules as [`Self::content_by_id`].
    pub async fn content_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
        session: Option<&UserSession>,
    ) -> AppResult<ContentDocument> {
        let access = read_access(kind, session)?;
        let document = self
            .content_repository
            .find_content_by_slug(kind, slug)
            .await?;

        visible_or_not_found(kind, document, &access)
    }

    /// Lists documents written by `author_id`.
    pub async fn content_by_author(
        &self,
        kind: ContentKind,
        author_id: &str,
        session: Option<&UserSession>,
    ) -> AppResult<Vec<ContentDocument>> {
        let access = read_access(kind, session)?;
        let include_drafts =
            access.holds(kind.view_draft_permission()) || access.user_id() == Some(author_id);

        self.content_repository
            .list_content_by_author(kind, author_id, include_drafts)
            .await
    }

    /// Lists published documents ranked by a counter, with the total count.
    pub async fn top_content(
        &self,
        kind: ContentKind,
        order_by: ContentOrder,
        limit: usize,
        skip: usize,
        session: Option<&UserSession>,
    ) -> AppResult<ContentPage> {
        read_access(kind, session)?;

        self.content_repository
            .list_top_content(TopContentQuery {
                kind,
                order_by,
                limit: page_limit(limit)?,
                skip,
            })
            .await
    }

    /// Searches one kind by free text, newest first.
    ///
    /// Drafts are included only for callers that may view drafts of the kind.
    pub async fn search_content(
        &self,
        kind: ContentKind,
        text: &str,
        limit: usize,
        skip: usize,
        session: Option<&UserSession>,
    ) -> AppResult<ContentPage> {
        let access = read_access(kind, session)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Query is required".to_owned()));
        }

        self.content_repository
            .search_content(ContentSearchQuery {
                kind,
                text: text.to_owned(),
                include_drafts: access.holds(kind.view_draft_permission()),
                limit: page_limit(limit)?,
                skip,
            })
            .await
    }
}

/// Rejects empty pages and caps the rest at [`MAX_PAGE_SIZE`].
pub(crate) fn page_limit(limit: usize) -> AppResult<usize> {
    if limit == 0 {
        return Err(AppError::Validation(
            "limit must be greater than zero".to_owned(),
        ));
    }

    Ok(limit.min(MAX_PAGE_SIZE))
}

fn read_access(kind: ContentKind, session: Option<&UserSession>) -> AppResult<ReadAccess<'_>> {
    match_or_public(
        session,
        &kind.read_permissions(),
        &[kind.view_published_permission()],
        &format!("You don't have the permission to view {}s", kind.as_str()),
    )
}

fn visible_or_not_found(
    kind: ContentKind,
    document: Option<ContentDocument>,
    access: &ReadAccess<'_>,
) -> AppResult<ContentDocument> {
    let not_found = || AppError::NotFound(format!("{} not found", kind.display_name()));
    let document = document.ok_or_else(not_found)?;

    if document.is_published
        || access.holds(kind.view_draft_permission())
        || access
            .user_id()
            .is_some_and(|user_id| document.is_authored_by(user_id))
    {
        return Ok(document);
    }

    Err(not_found())
}
