use std::str::FromStr;

use chrono::{DateTime, Utc};
use lectern_core::AppError;
use serde::{Deserialize, Serialize};

use crate::Permission;

mod document_update;

pub use document_update::{ContentFilter, ContentUpdate, Counter, MemberList};

/// Kinds of engageable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Blog post.
    Blog,
    /// Course.
    Course,
    /// Offered service.
    Service,
}

impl ContentKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Course => "course",
            Self::Service => "service",
        }
    }

    /// Returns the capitalized name used in caller-facing messages.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Blog => "Blog",
            Self::Course => "Course",
            Self::Service => "Service",
        }
    }

    /// Returns all content kinds.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ContentKind] = &[ContentKind::Blog, ContentKind::Course, ContentKind::Service];

        ALL
    }

    /// Permission needed to read published content of this kind.
    #[must_use]
    pub fn view_published_permission(&self) -> Permission {
        match self {
            Self::Blog => Permission::BlogsViewPublished,
            Self::Course => Permission::CourseViewPublished,
            Self::Service => Permission::ServiceViewPublished,
        }
    }

    /// Permission needed to read drafts of this kind.
    #[must_use]
    pub fn view_draft_permission(&self) -> Permission {
        match self {
            Self::Blog => Permission::BlogsViewDraft,
            Self::Course => Permission::CourseViewDraft,
            Self::Service => Permission::ServiceViewDraft,
        }
    }

    /// Permission needed to like content of this kind; courses cannot be liked.
    #[must_use]
    pub fn like_permission(&self) -> Option<Permission> {
        match self {
            Self::Blog => Some(Permission::BlogsLike),
            Self::Service => Some(Permission::ServiceLike),
            Self::Course => None,
        }
    }

    /// Permission needed to save content of this kind; courses cannot be saved.
    #[must_use]
    pub fn save_permission(&self) -> Option<Permission> {
        match self {
            Self::Blog => Some(Permission::BlogsSave),
            Self::Service => Some(Permission::ServiceSave),
            Self::Course => None,
        }
    }

    /// Read requirement: published or draft visibility.
    #[must_use]
    pub fn read_permissions(&self) -> [Permission; 2] {
        [
            self.view_published_permission(),
            self.view_draft_permission(),
        ]
    }
}

impl FromStr for ContentKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "blog" | "blogs" => Ok(Self::Blog),
            "course" | "courses" => Ok(Self::Course),
            "service" | "services" => Ok(Self::Service),
            _ => Err(AppError::Validation(format!(
                "unknown content kind '{value}'"
            ))),
        }
    }
}

/// Minimal identity record kept in membership lists, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    /// Account id.
    pub id: String,
    /// Account email.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Avatar image URL.
    pub image: Option<String>,
}

/// Blog post, course or service with its engagement state.
///
/// `likes` always equals `liked_by.len()` and `saves` equals
/// `saved_by.len()`. `views` may exceed `viewed_by.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
    /// Store-generated identifier.
    pub id: String,
    /// Content kind.
    pub kind: ContentKind,
    /// URL slug, unique per kind.
    pub slug: String,
    /// Title.
    pub title: String,
    /// Short summary.
    #[serde(default)]
    pub excerpt: String,
    /// Body.
    #[serde(default)]
    pub body: String,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Author.
    pub author: MemberRef,
    /// Whether the content is visible to the public.
    pub is_published: bool,
    /// View counter.
    #[serde(default)]
    pub views: u64,
    /// Like counter.
    #[serde(default)]
    pub likes: u64,
    /// Save counter.
    #[serde(default)]
    pub saves: u64,
    /// Authenticated viewers.
    #[serde(default)]
    pub viewed_by: Vec<MemberRef>,
    /// Viewer IP addresses.
    #[serde(default)]
    pub viewed_by_ip: Vec<String>,
    /// Users who liked the content.
    #[serde(default)]
    pub liked_by: Vec<MemberRef>,
    /// Users who saved the content.
    #[serde(default)]
    pub saved_by: Vec<MemberRef>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ContentDocument {
    /// Creates an unpublished document with zeroed engagement.
    #[must_use]
    pub fn draft(
        id: impl Into<String>,
        kind: ContentKind,
        slug: impl Into<String>,
        title: impl Into<String>,
        author: MemberRef,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            slug: slug.into(),
            title: title.into(),
            excerpt: String::new(),
            body: String::new(),
            tags: Vec::new(),
            author,
            is_published: false,
            views: 0,
            likes: 0,
            saves: 0,
            viewed_by: Vec::new(),
            viewed_by_ip: Vec::new(),
            liked_by: Vec::new(),
            saved_by: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the document marked as published.
    #[must_use]
    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    /// Returns whether `user_id` wrote this document.
    #[must_use]
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author.id == user_id
    }

    /// Returns whether `user_id` is present in a membership list.
    #[must_use]
    pub fn has_member(&self, list: MemberList, user_id: &str) -> bool {
        self.members(list).iter().any(|member| member.id == user_id)
    }

    /// Returns a membership list.
    #[must_use]
    pub fn members(&self, list: MemberList) -> &[MemberRef] {
        match list {
            MemberList::ViewedBy => &self.viewed_by,
            MemberList::LikedBy => &self.liked_by,
            MemberList::SavedBy => &self.saved_by,
        }
    }

    /// Returns whether both counter/membership pairs agree.
    #[must_use]
    pub fn engagement_is_consistent(&self) -> bool {
        self.likes == self.liked_by.len() as u64 && self.saves == self.saved_by.len() as u64
    }

    /// Case-insensitive substring match over title, excerpt, body and tags.
    #[must_use]
    pub fn matches_text(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        [self.title.as_str(), self.excerpt.as_str(), self.body.as_str()]
            .into_iter()
            .chain(self.tags.iter().map(String::as_str))
            .any(|field| field.to_lowercase().contains(needle.as_str()))
    }
}
