use std::sync::Arc;

use lectern_core::{AppError, AppResult, ServiceResponse};
use lectern_domain::{
    ContentDocument, ContentFilter, ContentKind, ContentUpdate, Counter, MemberList, Permission,
    UserSession,
};

use crate::{
    CallerContext, ContentRepository, PathRevalidator, UserRepository, require_any_permission,
};

mod saves;
mod views;

/// Idempotent like/save toggles and the monotonic view counter.
///
/// Every operation gates on permissions before touching a store and reports
/// its outcome as a [`ServiceResponse`].
#[derive(Clone)]
pub struct EngagementService {
    content_repository: Arc<dyn ContentRepository>,
    user_repository: Arc<dyn UserRepository>,
    path_revalidator: Arc<dyn PathRevalidator>,
}

impl EngagementService {
    /// Creates a new engagement service.
    #[must_use]
    pub fn new(
        content_repository: Arc<dyn ContentRepository>,
        user_repository: Arc<dyn UserRepository>,
        path_revalidator: Arc<dyn PathRevalidator>,
    ) -> Self {
        Self {
            content_repository,
            user_repository,
            path_revalidator,
        }
    }

    /// Likes a document on behalf of the caller.
    pub async fn like(
        &self,
        kind: ContentKind,
        content_id: &str,
        caller: &CallerContext,
        revalidate_path: Option<&str>,
    ) -> ServiceResponse<bool> {
        let result = self.like_content(kind, content_id, caller).await;
        self.finish(result, revalidate_path, &format!("{} liked successfully", kind.as_str()))
            .await
    }

    /// Removes the caller's like from a document.
    pub async fn unlike(
        &self,
        kind: ContentKind,
        content_id: &str,
        caller: &CallerContext,
        revalidate_path: Option<&str>,
    ) -> ServiceResponse<bool> {
        let result = self.unlike_content(kind, content_id, caller).await;
        self.finish(
            result,
            revalidate_path,
            &format!("{} like removed successfully", kind.as_str()),
        )
        .await
    }

    async fn like_content(
        &self,
        kind: ContentKind,
        content_id: &str,
        caller: &CallerContext,
    ) -> AppResult<bool> {
        let session = require_engagement_permission(kind, kind.like_permission(), caller, "like")?;
        let user_id = session.user_id();

        let document = self.published_document(kind, content_id).await?;
        let content_id = document.id.as_str();
        if document.has_member(MemberList::LikedBy, user_id) {
            return Err(AppError::AlreadyDone(format!(
                "You have already liked this {}",
                kind.as_str()
            )));
        }

        let updated = self
            .content_repository
            .find_one_and_update(
                ContentFilter::by_id(content_id)
                    .published()
                    .without_member(MemberList::LikedBy, user_id),
                ContentUpdate::new()
                    .increment(Counter::Likes, 1)
                    .add_member(MemberList::LikedBy, session.member_ref()),
            )
            .await?;

        match updated {
            Some(_) => Ok(true),
            None => Err(AppError::AlreadyDone(format!(
                "You have already liked this {}",
                kind.as_str()
            ))),
        }
    }

    async fn unlike_content(
        &self,
        kind: ContentKind,
        content_id: &str,
        caller: &CallerContext,
    ) -> AppResult<bool> {
        let session = require_engagement_permission(kind, kind.like_permission(), caller, "like")?;
        let user_id = session.user_id();

        let document = self.published_document(kind, content_id).await?;
        let content_id = document.id.as_str();
        if !document.has_member(MemberList::LikedBy, user_id) {
            return Err(not_liked(kind));
        }

        let updated = self
            .content_repository
            .find_one_and_update(
                ContentFilter::by_id(content_id)
                    .published()
                    .with_member(MemberList::LikedBy, user_id),
                ContentUpdate::new()
                    .increment(Counter::Likes, -1)
                    .pull_member(MemberList::LikedBy, user_id),
            )
            .await?;

        match updated {
            Some(_) => Ok(true),
            None => Err(not_liked(kind)),
        }
    }

    /// Loads a document of `kind` and rejects drafts.
    async fn published_document(
        &self,
        kind: ContentKind,
        content_id: &str,
    ) -> AppResult<ContentDocument> {
        let document = self
            .content_repository
            .find_content_by_id(content_id)
            .await?
            .filter(|document| document.kind == kind)
            .ok_or_else(|| not_found(kind))?;

        if !document.is_published {
            return Err(AppError::NotPublished(format!(
                "This {} is not published yet",
                kind.as_str()
            )));
        }

        Ok(document)
    }

    /// Revalidates the page after a successful mutation and wraps the result.
    async fn finish<T>(
        &self,
        result: AppResult<T>,
        revalidate_path: Option<&str>,
        success_message: &str,
    ) -> ServiceResponse<T> {
        if result.is_ok()
            && let Some(path) = revalidate_path
            && let Err(error) = self.path_revalidator.revalidate_path(path).await
        {
            tracing::warn!(path, %error, "path revalidation failed after mutation");
        }

        ServiceResponse::from_result(result, success_message)
    }
}

fn require_engagement_permission<'a>(
    kind: ContentKind,
    permission: Option<Permission>,
    caller: &'a CallerContext,
    action: &str,
) -> AppResult<&'a UserSession> {
    let denial = format!(
        "You don't have the permission to {action} {}s",
        kind.as_str()
    );
    let Some(permission) = permission else {
        return Err(AppError::Unauthorized(denial));
    };

    require_any_permission(caller.session.as_ref(), &[permission], &denial)
        .map(|permission_match| permission_match.session)
}

fn not_found(kind: ContentKind) -> AppError {
    AppError::NotFound(format!("{} not found", kind.display_name()))
}

fn not_liked(kind: ContentKind) -> AppError {
    AppError::NotDone(format!("You have not liked this {} yet", kind.as_str()))
}
