use lectern_core::{AppResult, ServiceResponse};
use lectern_domain::{ContentDocument, ContentFilter, ContentKind, ContentUpdate, Counter, MemberList};

use super::{EngagementService, not_found};
use crate::{CallerContext, match_or_public};

impl EngagementService {
    /// Records a view of the document with `slug` and returns it.
    ///
    /// Published documents get `views + 1` on every call, plus set-adds of the
    /// authenticated caller and the caller IP. Drafts are returned unchanged
    /// to their author and to draft-view holders.
    pub async fn view(
        &self,
        kind: ContentKind,
        slug: &str,
        caller: &CallerContext,
        revalidate_path: Option<&str>,
    ) -> ServiceResponse<ContentDocument> {
        let result = self.view_content(kind, slug, caller).await;
        let revalidate_path = match &result {
            Ok((_, true)) => revalidate_path,
            _ => None,
        };
        self.finish(
            result.map(|(document, _)| document),
            revalidate_path,
            &format!("{} viewed successfully", kind.as_str()),
        )
        .await
    }

    async fn view_content(
        &self,
        kind: ContentKind,
        slug: &str,
        caller: &CallerContext,
    ) -> AppResult<(ContentDocument, bool)> {
        let access = match_or_public(
            caller.session.as_ref(),
            &kind.read_permissions(),
            &[kind.view_published_permission()],
            &format!("You don't have the permission to view {}s", kind.as_str()),
        )?;

        let document = self
            .content_repository
            .find_content_by_slug(kind, slug)
            .await?
            .ok_or_else(|| not_found(kind))?;

        if !document.is_published {
            let is_author = access
                .user_id()
                .is_some_and(|user_id| document.is_authored_by(user_id));
            if is_author || access.holds(kind.view_draft_permission()) {
                return Ok((document, false));
            }
            return Err(not_found(kind));
        }

        let mut update = ContentUpdate::new().increment(Counter::Views, 1);
        if let Some(session) = access.session {
            update = update.add_member(MemberList::ViewedBy, session.member_ref());
        }
        if let Some(ip_address) = caller.ip_address.as_deref() {
            update = update.add_viewer_ip(ip_address);
        }

        let updated = self
            .content_repository
            .find_one_and_update(ContentFilter::by_id(document.id.as_str()).published(), update)
            .await?;

        Ok(match updated {
            Some(updated) => (updated, true),
            None => (document, false),
        })
    }
}
