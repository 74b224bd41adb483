//! Conditional find-and-modify description shared by every content store.
//!
//! Adapters evaluate [`ContentFilter::matches`] and [`ContentUpdate::apply`]
//! while holding exclusive access to one document, so the counter change and
//! the membership change land together or not at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentDocument, MemberRef};

/// Membership lists on a content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberList {
    /// `viewed_by`.
    ViewedBy,
    /// `liked_by`.
    LikedBy,
    /// `saved_by`.
    SavedBy,
}

/// Engagement counters on a content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    /// `views`.
    Views,
    /// `likes`.
    Likes,
    /// `saves`.
    Saves,
}

/// Preconditions a document must satisfy for an update to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFilter {
    content_id: String,
    published_only: bool,
    member_absent: Option<(MemberList, String)>,
    member_present: Option<(MemberList, String)>,
}

impl ContentFilter {
    /// Matches the document with the given id.
    #[must_use]
    pub fn by_id(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            published_only: false,
            member_absent: None,
            member_present: None,
        }
    }

    /// Additionally requires the document to be published.
    #[must_use]
    pub fn published(mut self) -> Self {
        self.published_only = true;
        self
    }

    /// Additionally requires `user_id` to be missing from `list`.
    #[must_use]
    pub fn without_member(mut self, list: MemberList, user_id: impl Into<String>) -> Self {
        self.member_absent = Some((list, user_id.into()));
        self
    }

    /// Additionally requires `user_id` to be present in `list`.
    #[must_use]
    pub fn with_member(mut self, list: MemberList, user_id: impl Into<String>) -> Self {
        self.member_present = Some((list, user_id.into()));
        self
    }

    /// Returns the targeted document id.
    #[must_use]
    pub fn content_id(&self) -> &str {
        self.content_id.as_str()
    }

    /// Evaluates the filter against a document.
    #[must_use]
    pub fn matches(&self, document: &ContentDocument) -> bool {
        if document.id != self.content_id {
            return false;
        }

        if self.published_only && !document.is_published {
            return false;
        }

        if let Some((list, user_id)) = &self.member_absent
            && document.has_member(*list, user_id)
        {
            return false;
        }

        if let Some((list, user_id)) = &self.member_present
            && !document.has_member(*list, user_id)
        {
            return false;
        }

        true
    }
}

/// Counter and set operations applied in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentUpdate {
    increments: Vec<(Counter, i64)>,
    additions: Vec<(MemberList, MemberRef)>,
    removals: Vec<(MemberList, String)>,
    viewer_ip: Option<String>,
}

impl ContentUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to a counter. Counters never go below zero.
    #[must_use]
    pub fn increment(mut self, counter: Counter, delta: i64) -> Self {
        self.increments.push((counter, delta));
        self
    }

    /// Set-adds a member, keyed by member id.
    #[must_use]
    pub fn add_member(mut self, list: MemberList, member: MemberRef) -> Self {
        self.additions.push((list, member));
        self
    }

    /// Removes every entry for `user_id` from a list.
    #[must_use]
    pub fn pull_member(mut self, list: MemberList, user_id: impl Into<String>) -> Self {
        self.removals.push((list, user_id.into()));
        self
    }

    /// Set-adds a viewer IP address.
    #[must_use]
    pub fn add_viewer_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.viewer_ip = Some(ip_address.into());
        self
    }

    /// Applies the update to a document that passed its filter.
    pub fn apply(&self, document: &mut ContentDocument, now: DateTime<Utc>) {
        for (counter, delta) in &self.increments {
            let value = match counter {
                Counter::Views => &mut document.views,
                Counter::Likes => &mut document.likes,
                Counter::Saves => &mut document.saves,
            };
            *value = if *delta >= 0 {
                value.saturating_add(delta.unsigned_abs())
            } else {
                value.saturating_sub(delta.unsigned_abs())
            };
        }

        for (list, member) in &self.additions {
            let members = members_mut(document, *list);
            if !members.iter().any(|existing| existing.id == member.id) {
                members.push(member.clone());
            }
        }

        for (list, user_id) in &self.removals {
            members_mut(document, *list).retain(|existing| &existing.id != user_id);
        }

        if let Some(ip_address) = &self.viewer_ip
            && !document.viewed_by_ip.contains(ip_address)
        {
            document.viewed_by_ip.push(ip_address.clone());
        }

        document.updated_at = now;
    }
}

fn members_mut(document: &mut ContentDocument, list: MemberList) -> &mut Vec<MemberRef> {
    match list {
        MemberList::ViewedBy => &mut document.viewed_by,
        MemberList::LikedBy => &mut document.liked_by,
        MemberList::SavedBy => &mut document.saved_by,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;

    use super::{ContentFilter, ContentUpdate, Counter, MemberList};
    use crate::{ContentDocument, ContentKind, MemberRef};

    fn member(id: &str) -> MemberRef {
        MemberRef {
            id: id.to_owned(),
            email: format!("{id}@example.com"),
            name: None,
            image: None,
        }
    }

    fn document() -> ContentDocument {
        ContentDocument::draft("c1", ContentKind::Blog, "hello", "Hello", member("author"), Utc::now())
            .published()
    }

    #[test]
    fn filter_rejects_drafts_when_published_required() {
        let mut draft = document();
        draft.is_published = false;

        assert!(!ContentFilter::by_id("c1").published().matches(&draft));
        assert!(ContentFilter::by_id("c1").matches(&draft));
    }

    #[test]
    fn filter_checks_membership() {
        let mut doc = document();
        doc.liked_by.push(member("u1"));

        let absent = ContentFilter::by_id("c1").without_member(MemberList::LikedBy, "u1");
        let present = ContentFilter::by_id("c1").with_member(MemberList::LikedBy, "u1");
        assert!(!absent.matches(&doc));
        assert!(present.matches(&doc));
    }

    #[test]
    fn add_member_is_keyed_by_id() {
        let mut doc = document();
        let update = ContentUpdate::new().add_member(MemberList::ViewedBy, member("u1"));

        update.apply(&mut doc, Utc::now());
        update.apply(&mut doc, Utc::now());

        assert_eq!(doc.viewed_by.len(), 1);
    }

    #[test]
    fn counters_saturate_at_zero() {
        let mut doc = document();
        ContentUpdate::new()
            .increment(Counter::Likes, -1)
            .pull_member(MemberList::LikedBy, "u1")
            .apply(&mut doc, Utc::now());

        assert_eq!(doc.likes, 0);
        assert!(doc.engagement_is_consistent());
    }

    #[test]
    fn viewer_ips_are_deduplicated() {
        let mut doc = document();
        let update = ContentUpdate::new()
            .increment(Counter::Views, 1)
            .add_viewer_ip("10.0.0.1");

        update.apply(&mut doc, Utc::now());
        update.apply(&mut doc, Utc::now());

        assert_eq!(doc.views, 2);
        assert_eq!(doc.viewed_by_ip, vec!["10.0.0.1".to_owned()]);
    }

    proptest! {
        #[test]
        fn guarded_toggles_keep_counters_consistent(
            operations in proptest::collection::vec((0_u8..5, any::<bool>()), 0..64)
        ) {
            let mut doc = document();
            for (user, like) in operations {
                let user_id = format!("u{user}");
                let (filter, update) = if like {
                    (
                        ContentFilter::by_id("c1")
                            .published()
                            .without_member(MemberList::LikedBy, user_id.clone()),
                        ContentUpdate::new()
                            .increment(Counter::Likes, 1)
                            .add_member(MemberList::LikedBy, member(&user_id)),
                    )
                } else {
                    (
                        ContentFilter::by_id("c1").with_member(MemberList::LikedBy, user_id.clone()),
                        ContentUpdate::new()
                            .increment(Counter::Likes, -1)
                            .pull_member(MemberList::LikedBy, user_id),
                    )
                };

                if filter.matches(&doc) {
                    update.apply(&mut doc, Utc::now());
                }
            }

            prop_assert!(doc.engagement_is_consistent());
        }
    }
}
