use chrono::Utc;
use lectern_core::{AppError, AppResult, ServiceResponse};
use lectern_domain::{
    ContentFilter, ContentKind, ContentUpdate, Counter, MemberList, SavedContentRef,
};

use super::{EngagementService, require_engagement_permission};
use crate::CallerContext;

impl EngagementService {
    /// Saves a document for the caller on both the content and the account side.
    ///
    /// When only one side reflects the save, the missing side is written and
    /// the call succeeds.
    pub async fn save(
        &self,
        kind: ContentKind,
        content_id: &str,
        caller: &CallerContext,
        revalidate_path: Option<&str>,
    ) -> ServiceResponse<bool> {
        let result = self.save_content(kind, content_id, caller).await;
        self.finish(result, revalidate_path, &format!("{} saved successfully", kind.as_str()))
            .await
    }

    /// Removes a save from both sides, repairing one-sided drift.
    pub async fn unsave(
        &self,
        kind: ContentKind,
        content_id: &str,
        caller: &CallerContext,
        revalidate_path: Option<&str>,
    ) -> ServiceResponse<bool> {
        let result = self.unsave_content(kind, content_id, caller).await;
        self.finish(
            result,
            revalidate_path,
            &format!("{} unsaved successfully", kind.as_str()),
        )
        .await
    }

    async fn save_content(
        &self,
        kind: ContentKind,
        content_id: &str,
        caller: &CallerContext,
    ) -> AppResult<bool> {
        let session = require_engagement_permission(kind, kind.save_permission(), caller, "save")?;
        let user_id = session.user_id();

        let document = self.published_document(kind, content_id).await?;
        let content_id = document.id.as_str();
        let account = self
            .user_repository
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

        let in_content = document.has_member(MemberList::SavedBy, user_id);
        let in_account = account.has_saved(content_id);
        if in_content && in_account {
            return Err(AppError::AlreadyDone(format!(
                "You have already saved this {}",
                kind.as_str()
            )));
        }

        if !in_account {
            self.user_repository
                .add_saved_content(
                    user_id,
                    SavedContentRef {
                        reference: content_id.to_owned(),
                        kind,
                        created_at: Utc::now(),
                    },
                )
                .await?;
        }

        if !in_content {
            let updated = self
                .content_repository
                .find_one_and_update(
                    ContentFilter::by_id(content_id)
                        .published()
                        .without_member(MemberList::SavedBy, user_id),
                    ContentUpdate::new()
                        .increment(Counter::Saves, 1)
                        .add_member(MemberList::SavedBy, session.member_ref()),
                )
                .await?;

            if updated.is_none() {
                tracing::debug!(content_id, user_id, "content side of save already applied");
            }
        } else {
            tracing::info!(content_id, user_id, "repaired save missing from account record");
        }

        Ok(true)
    }

    async fn unsave_content(
        &self,
        kind: ContentKind,
        content_id: &str,
        caller: &CallerContext,
    ) -> AppResult<bool> {
        let session = require_engagement_permission(kind, kind.save_permission(), caller, "save")?;
        let user_id = session.user_id();

        let document = self.published_document(kind, content_id).await?;
        let content_id = document.id.as_str();
        let account = self
            .user_repository
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

        let in_content = document.has_member(MemberList::SavedBy, user_id);
        let in_account = account.has_saved(content_id);
        if !in_content && !in_account {
            return Err(AppError::NotDone(format!(
                "You have not saved this {} yet",
                kind.as_str()
            )));
        }

        if in_account {
            self.user_repository
                .remove_saved_content(user_id, content_id)
                .await?;
        }

        if in_content {
            let updated = self
                .content_repository
                .find_one_and_update(
                    ContentFilter::by_id(content_id)
                        .published()
                        .with_member(MemberList::SavedBy, user_id),
                    ContentUpdate::new()
                        .increment(Counter::Saves, -1)
                        .pull_member(MemberList::SavedBy, user_id),
                )
                .await?;

            if updated.is_none() {
                tracing::debug!(content_id, user_id, "content side of unsave already applied");
            }
        }

        Ok(true)
    }
}
